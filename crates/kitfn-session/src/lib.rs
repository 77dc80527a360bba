// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session context for one function invocation.
//!
//! An [`InboundRequest`] is parsed once into an immutable [`ParsedEvent`];
//! a [`KitSession`] is built from it and owns the mutable state of the
//! invocation: variables, skills, priority, the scoped store and the reply
//! being assembled. [`KitSession::get_response_body`] projects that state
//! into the shape the platform expects for the event kind.

pub mod event;
pub mod reply;
pub mod request;
pub mod response;
pub mod session;

pub use event::{CallBody, EventBody, Identity, ParsedEvent};
pub use reply::ReplyAssembler;
pub use request::InboundRequest;
pub use session::KitSession;
