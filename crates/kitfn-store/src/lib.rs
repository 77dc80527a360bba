// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped key-value storage backed by the platform KV API.
//!
//! The store keeps three string maps in memory (`function`, `global`,
//! `conversation`). [`ScopedStore::load`] fills them from remote blobs and
//! [`ScopedStore::commit`] writes them back. Remote keys are supplied by the
//! caller through [`ScopeKeys`]; the store never derives them.

pub mod keys;
pub mod store;

pub use keys::ScopeKeys;
pub use store::{CommitReport, KV_GET_PATH, KV_PUT_PATH, ScopeMap, ScopeWrite, ScopedStore};
