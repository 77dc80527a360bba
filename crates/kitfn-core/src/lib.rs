// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the kitfn session adapter.
//!
//! This crate provides the error type, the data model shared by the scoped
//! store and the session, and the [`KitApi`] collaborator trait that the
//! HTTP client and the test mocks implement.

pub mod error;
pub mod lenient;
pub mod traits;
pub mod types;
pub mod util;

// Re-export key items at crate root for ergonomic imports.
pub use error::KitError;
pub use traits::KitApi;
pub use types::{
    CallInfo, Command, Conversation, EventKind, IncomingMessage, InvalidPriority, PayloadItem,
    Priority, QueueInfo, ReplyMessage, Scope, Sender, Skill,
};
