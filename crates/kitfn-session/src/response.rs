// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The response body returned to the platform.

use serde_json::{Value, json};

use crate::event::EventBody;
use crate::session::KitSession;

impl KitSession {
    /// Projects the session into the body the platform expects.
    ///
    /// - call events: `{"VARIABLES": .., "SKILLS": ..}`; `data` is ignored.
    /// - message events: the current skills and priority are written into the
    ///   reply's transfer item, then `{"text", "payload", "variables"}`.
    /// - anything else: `data` unchanged.
    pub fn get_response_body(&mut self, data: Value) -> Value {
        match self.event.body() {
            EventBody::Call(_) => json!({
                "VARIABLES": self.variables,
                "SKILLS": self.skills,
            }),
            EventBody::Message(_) => {
                self.reply.fold_routing(&self.skills, self.priority);
                let message = self.reply.message();
                json!({
                    "text": message.text,
                    "payload": message.payload,
                    "variables": self.variables,
                })
            }
            EventBody::Webhook(_) => data,
        }
    }
}
