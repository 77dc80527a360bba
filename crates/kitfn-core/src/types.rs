// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store, the session and the response projector.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::lenient;

/// Classification of the inbound trigger, read from the `x-kit-event-type`
/// header.
///
/// Unrecognized header values are kept verbatim in [`EventKind::Other`]; such
/// a session behaves like a webhook everywhere because none of the
/// kind-specific branches match it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A function invoked from a running call scenario.
    InCallFunction,
    /// An inbound chat message routed to the function.
    IncomingMessage,
    /// A generic HTTP webhook.
    #[default]
    Webhook,
    /// Any other header value.
    Other(String),
}

impl EventKind {
    pub const IN_CALL_FUNCTION: &'static str = "in_call_function";
    pub const INCOMING_MESSAGE: &'static str = "incoming_message";
    pub const WEBHOOK: &'static str = "webhook";

    /// Classifies a raw header value. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw {
            Self::IN_CALL_FUNCTION => EventKind::InCallFunction,
            Self::INCOMING_MESSAGE => EventKind::IncomingMessage,
            Self::WEBHOOK => EventKind::Webhook,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::InCallFunction => Self::IN_CALL_FUNCTION,
            EventKind::IncomingMessage => Self::INCOMING_MESSAGE,
            EventKind::Webhook => Self::WEBHOOK,
            EventKind::Other(raw) => raw,
        }
    }

    pub fn is_incoming_message(&self) -> bool {
        matches!(self, EventKind::IncomingMessage)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three key-value namespaces of the scoped store.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Storage private to one function.
    Function,
    /// Account-wide storage shared by every function of a domain.
    #[default]
    Global,
    /// Storage tied to one chat conversation.
    Conversation,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Function, Scope::Global, Scope::Conversation];
}

/// A routing skill with its level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub skill_name: String,
    pub level: i64,
}

/// Target queue of a `transfer_to_queue` command.
///
/// Either field alone identifies a queue; a value with both unset is
/// rejected by the reply assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    #[serde(default)]
    pub queue_id: Option<i64>,
    #[serde(default)]
    pub queue_name: Option<String>,
}

impl QueueInfo {
    pub fn by_id(queue_id: i64) -> Self {
        Self {
            queue_id: Some(queue_id),
            queue_name: None,
        }
    }

    pub fn by_name(queue_name: impl Into<String>) -> Self {
        Self {
            queue_id: None,
            queue_name: Some(queue_name.into()),
        }
    }

    /// True when neither the id nor the name is set.
    pub fn is_unset(&self) -> bool {
        self.queue_id.is_none() && self.queue_name.is_none()
    }
}

/// Routing priority, an integer from 0 to 10.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Priority(u8);

impl Priority {
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A value that cannot be used as a [`Priority`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("the value {0} cannot be set as a priority, an integer from 0 to 10 is expected")]
pub struct InvalidPriority(pub String);

macro_rules! priority_from_int {
    ($($t:ty),*) => {$(
        impl TryFrom<$t> for Priority {
            type Error = InvalidPriority;

            fn try_from(value: $t) -> Result<Self, Self::Error> {
                u8::try_from(value)
                    .ok()
                    .and_then(Priority::new)
                    .ok_or_else(|| InvalidPriority(value.to_string()))
            }
        }
    )*};
}

priority_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl TryFrom<f64> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() && value.fract() == 0.0 && (0.0..=f64::from(Self::MAX)).contains(&value)
        {
            Ok(Self(value as u8))
        } else {
            Err(InvalidPriority(value.to_string()))
        }
    }
}

impl TryFrom<f32> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Priority::try_from(f64::from(value))
    }
}

/// Call metadata carried in the `CALL` field of call and webhook bodies.
///
/// Every field is read leniently: a value of the wrong type becomes `None`
/// rather than rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallInfo {
    #[serde(deserialize_with = "lenient::opt_int")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub result_code: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub attempt_num: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub session_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub callerid: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub destination: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub display_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub phone_a: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub phone_b: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub record_url: Option<String>,
    /// Fields the platform sends that are not modelled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The conversation an inbound message belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conversation {
    #[serde(deserialize_with = "lenient::opt_int")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::string")]
    pub uuid: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub client_id: Option<String>,
    pub custom_data: serde_json::Value,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Conversation {
    /// Variables stored under `custom_data.request_data.variables`, if any.
    pub fn request_variables(&self) -> Option<&serde_json::Value> {
        self.custom_data.pointer("/request_data/variables")
    }
}

/// Body of an `incoming_message` event.
///
/// A null or mistyped field falls back to its default on its own; the rest
/// of the message is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomingMessage {
    #[serde(deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub message_type: String,
    pub sender: serde_json::Value,
    #[serde(deserialize_with = "lenient::or_default")]
    pub conversation: Conversation,
    #[serde(deserialize_with = "lenient::or_default")]
    pub payload: Vec<serde_json::Value>,
    pub customer: serde_json::Value,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Sender block of the reply message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub is_bot: bool,
}

/// A control instruction to the platform carried in the reply payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Command {
    /// Close the current request of the conversation.
    FinishRequest,
    /// Hand the conversation over to a queue.
    TransferToQueue {
        queue: QueueInfo,
        skills: Vec<Skill>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority: Option<u8>,
    },
}

/// One entry of the reply payload, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayloadItem {
    Properties { message_type: String },
    Cmd(Command),
    Photo {
        url: String,
        file_name: String,
        file_size: u64,
    },
}

impl PayloadItem {
    /// The properties item every chat reply starts with.
    pub fn text_properties() -> Self {
        PayloadItem::Properties {
            message_type: "text".to_string(),
        }
    }

    pub fn photo(url: impl Into<String>) -> Self {
        PayloadItem::Photo {
            url: url.into(),
            file_name: "file".to_string(),
            file_size: 123,
        }
    }

    pub fn is_finish_request(&self) -> bool {
        matches!(self, PayloadItem::Cmd(Command::FinishRequest))
    }

    pub fn is_transfer_to_queue(&self) -> bool {
        matches!(self, PayloadItem::Cmd(Command::TransferToQueue { .. }))
    }
}

/// The outgoing message assembled during a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyMessage {
    pub text: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
    pub payload: Vec<PayloadItem>,
}

impl ReplyMessage {
    /// An empty reply authored by the bot.
    pub fn from_bot() -> Self {
        Self {
            sender: Sender { is_bot: true },
            ..Self::default()
        }
    }
}
