// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembly of the outgoing chat reply.
//!
//! The payload holds at most one `finish_request` and at most one
//! `transfer_to_queue` command. Both are maintained through [`upsert_by`] and
//! [`remove_by`], so the invariant holds no matter how often the commands
//! are issued or cancelled.

use kitfn_core::{Command, IncomingMessage, PayloadItem, Priority, QueueInfo, ReplyMessage, Skill};

/// Builds the [`ReplyMessage`] of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyAssembler {
    message: ReplyMessage,
}

impl ReplyAssembler {
    /// An empty reply with no payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bot reply to `incoming`: same type, same conversation, payload
    /// starting with the text properties item.
    pub fn for_message(incoming: &IncomingMessage) -> Self {
        Self {
            message: ReplyMessage {
                message_type: incoming.message_type.clone(),
                conversation: Some(incoming.conversation.clone()),
                payload: vec![PayloadItem::text_properties()],
                ..ReplyMessage::from_bot()
            },
        }
    }

    pub fn message(&self) -> &ReplyMessage {
        &self.message
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.message.text = text.into();
    }

    /// Adds the `finish_request` command unless it is already present.
    pub fn finish_request(&mut self) {
        upsert_by(
            &mut self.message.payload,
            PayloadItem::is_finish_request,
            || PayloadItem::Cmd(Command::FinishRequest),
            |_| {},
        );
    }

    pub fn cancel_finish_request(&mut self) {
        remove_by(&mut self.message.payload, PayloadItem::is_finish_request);
    }

    /// Sets the transfer target. An existing transfer item keeps its skills
    /// and priority and only has its queue replaced.
    ///
    /// Returns `false` and leaves the payload untouched when `queue` has
    /// neither an id nor a name.
    pub fn transfer_to_queue(&mut self, queue: QueueInfo) -> bool {
        if queue.is_unset() {
            return false;
        }
        let fresh = queue.clone();
        upsert_by(
            &mut self.message.payload,
            PayloadItem::is_transfer_to_queue,
            move || {
                PayloadItem::Cmd(Command::TransferToQueue {
                    queue: fresh,
                    skills: Vec::new(),
                    priority: None,
                })
            },
            move |item| {
                if let PayloadItem::Cmd(Command::TransferToQueue { queue: current, .. }) = item {
                    *current = queue;
                }
            },
        );
        true
    }

    pub fn cancel_transfer_to_queue(&mut self) {
        remove_by(&mut self.message.payload, PayloadItem::is_transfer_to_queue);
    }

    pub fn add_photo(&mut self, url: impl Into<String>) {
        self.message.payload.push(PayloadItem::photo(url));
    }

    /// Copies the routing state into the transfer item, if there is one.
    pub fn fold_routing(&mut self, routing_skills: &[Skill], routing_priority: Priority) {
        for item in &mut self.message.payload {
            if let PayloadItem::Cmd(Command::TransferToQueue {
                skills, priority, ..
            }) = item
            {
                *skills = routing_skills.to_vec();
                *priority = Some(routing_priority.get());
            }
        }
    }
}

/// Updates the first element matching `matches`, or appends `create()` when
/// none does.
pub fn upsert_by<T>(
    items: &mut Vec<T>,
    matches: impl Fn(&T) -> bool,
    create: impl FnOnce() -> T,
    update: impl FnOnce(&mut T),
) {
    match items.iter_mut().find(|item| matches(item)) {
        Some(existing) => update(existing),
        None => items.push(create()),
    }
}

/// Removes every element matching `matches`. Returns whether any was removed.
pub fn remove_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}
