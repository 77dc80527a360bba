// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-pass interpretation of an [`InboundRequest`].
//!
//! The event kind header decides how the body is read. This is the only
//! place the body is inspected; everything downstream matches on
//! [`EventBody`].

use std::collections::BTreeMap;

use kitfn_core::lenient::int_value;
use kitfn_core::util::{header_value, string_map};
use kitfn_core::{CallInfo, EventKind, IncomingMessage, Skill};
use kitfn_store::ScopeKeys;
use serde_json::{Map, Value};
use tracing::warn;

use crate::request::InboundRequest;

pub const EVENT_TYPE_HEADER: &str = "x-kit-event-type";
pub const ACCESS_TOKEN_HEADER: &str = "x-kit-access-token";
pub const API_URL_HEADER: &str = "x-kit-api-url";
pub const DOMAIN_HEADER: &str = "x-kit-domain";
pub const FUNCTION_ID_HEADER: &str = "x-kit-function-id";
pub const SESSION_ACCESS_URL_HEADER: &str = "x-kit-session-access-url";

/// API host used when the request names none.
pub const DEFAULT_API_URL: &str = "kitapi-eu.voximplant.com";

/// Who is calling and where the platform API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub access_token: String,
    pub api_url: String,
    pub domain: String,
    pub function_id: String,
    pub session_access_url: String,
}

/// Body fields of call-function and webhook events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallBody {
    pub call: Option<CallInfo>,
    pub variables: BTreeMap<String, String>,
    pub skills: Vec<Skill>,
    pub headers: Option<Map<String, Value>>,
}

/// The interpreted body, one variant per event shape.
#[derive(Debug, Clone, PartialEq)]
pub enum EventBody {
    /// `in_call_function`: variables are read from `VARIABLES`.
    Call(CallBody),
    /// `incoming_message`.
    Message(Box<IncomingMessage>),
    /// `webhook` and unrecognized kinds: no variables are seeded.
    Webhook(CallBody),
}

/// Immutable result of parsing one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    kind: EventKind,
    identity: Identity,
    body: EventBody,
}

impl ParsedEvent {
    /// Parses `request` with [`DEFAULT_API_URL`] as the API host fallback.
    pub fn parse(request: &InboundRequest) -> Self {
        Self::parse_with(request, DEFAULT_API_URL)
    }

    /// Parses `request`, using `default_api_url` when the API url header is
    /// absent. Never fails: malformed parts fall back to empty values.
    pub fn parse_with(request: &InboundRequest, default_api_url: &str) -> Self {
        let headers = &request.headers;
        let kind = EventKind::parse(&header_value(headers, EVENT_TYPE_HEADER, EventKind::WEBHOOK));

        let identity = Identity {
            access_token: header_value(headers, ACCESS_TOKEN_HEADER, ""),
            api_url: header_value(headers, API_URL_HEADER, default_api_url),
            domain: header_value(headers, DOMAIN_HEADER, ""),
            function_id: header_value(headers, FUNCTION_ID_HEADER, "0"),
            session_access_url: header_value(headers, SESSION_ACCESS_URL_HEADER, ""),
        };

        let body = match &kind {
            EventKind::IncomingMessage => EventBody::Message(Box::new(parse_message(&request.body))),
            EventKind::InCallFunction => EventBody::Call(CallBody::parse(&request.body, true)),
            EventKind::Webhook | EventKind::Other(_) => {
                EventBody::Webhook(CallBody::parse(&request.body, false))
            }
        };

        Self {
            kind,
            identity,
            body,
        }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn body(&self) -> &EventBody {
        &self.body
    }

    /// The inbound chat message, for message events.
    pub fn message(&self) -> Option<&IncomingMessage> {
        match &self.body {
            EventBody::Message(message) => Some(&**message),
            EventBody::Call(_) | EventBody::Webhook(_) => None,
        }
    }

    /// Call-shaped body fields, for call and webhook events.
    pub fn call_body(&self) -> Option<&CallBody> {
        match &self.body {
            EventBody::Call(body) | EventBody::Webhook(body) => Some(body),
            EventBody::Message(_) => None,
        }
    }

    /// Remote keys of the scopes this event may use.
    ///
    /// Only message events with a conversation uuid get a conversation key.
    pub fn scope_keys(&self) -> ScopeKeys {
        let conversation = self
            .message()
            .map(|m| m.conversation.uuid.as_str())
            .filter(|uuid| !uuid.is_empty());
        ScopeKeys::for_session(
            &self.identity.function_id,
            &self.identity.domain,
            conversation,
        )
    }

    /// Variables the session starts with.
    pub fn initial_variables(&self) -> BTreeMap<String, String> {
        match &self.body {
            EventBody::Call(body) => body.variables.clone(),
            EventBody::Message(message) => message
                .conversation
                .request_variables()
                .map(string_map)
                .unwrap_or_default(),
            EventBody::Webhook(_) => BTreeMap::new(),
        }
    }
}

impl CallBody {
    fn parse(body: &Value, with_variables: bool) -> Self {
        let call = body
            .get("CALL")
            .filter(|call| !call.is_null())
            .and_then(|call| match serde_json::from_value::<CallInfo>(call.clone()) {
                Ok(call) => Some(call),
                Err(e) => {
                    warn!(error = %e, "ignoring CALL field that is not an object");
                    None
                }
            });

        let variables = if with_variables {
            body.get("VARIABLES").map(string_map).unwrap_or_default()
        } else {
            BTreeMap::new()
        };

        let skills = match body.get("SKILLS") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => {
                dedupe_skills(entries.iter().filter_map(parse_skill).collect())
            }
            Some(other) => {
                warn!(skills = %other, "ignoring SKILLS field that is not a list");
                Vec::new()
            }
        };

        let headers = body.get("HEADERS").and_then(Value::as_object).cloned();

        Self {
            call,
            variables,
            skills,
            headers,
        }
    }
}

/// One `SKILLS` entry. Entries without a name or with a non-integer level
/// are dropped on their own.
fn parse_skill(entry: &Value) -> Option<Skill> {
    let skill_name = entry.get("skill_name").and_then(Value::as_str);
    let level = entry.get("level").and_then(int_value);
    match (skill_name, level) {
        (Some(name), Some(level)) => Some(Skill {
            skill_name: name.to_string(),
            level,
        }),
        _ => {
            warn!(skill = %entry, "ignoring malformed skill entry");
            None
        }
    }
}

/// Collapses repeated skill names, keeping the first position and the last
/// level.
fn dedupe_skills(skills: Vec<Skill>) -> Vec<Skill> {
    let mut unique: Vec<Skill> = Vec::with_capacity(skills.len());
    for skill in skills {
        match unique.iter_mut().find(|s| s.skill_name == skill.skill_name) {
            Some(existing) => existing.level = skill.level,
            None => unique.push(skill),
        }
    }
    unique
}

fn parse_message(body: &Value) -> IncomingMessage {
    if body.is_null() {
        return IncomingMessage::default();
    }
    serde_json::from_value(body.clone()).unwrap_or_else(|e| {
        warn!(error = %e, "incoming message body is malformed, using an empty message");
        IncomingMessage::default()
    })
}
