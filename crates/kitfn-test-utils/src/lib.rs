// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for kitfn.
//!
//! - [`MockKitApi`] - in-memory platform API with scripted blobs, failure
//!   injection and request capture
//! - [`fixtures`] - inbound request builders for the three event kinds

pub mod fixtures;
pub mod mock_api;

pub use mock_api::{MockKitApi, RecordedCall};
