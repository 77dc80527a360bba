// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The platform API collaborator used for storage and helper calls.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::KitError;

/// Generic remote call into the platform API.
///
/// Implementations own transport concerns (scheme, authentication, timeouts).
/// Callers in the session core treat every `Err` as recoverable.
#[async_trait]
pub trait KitApi: Send + Sync + 'static {
    /// Human-readable name of this client, used in log fields.
    fn name(&self) -> &str;

    /// POSTs `payload` to `path` and returns the decoded response body.
    async fn request(&self, path: &str, payload: Value) -> Result<Value, KitError>;

    /// Returns a client bound to `access_token`, leaving `self` untouched.
    fn with_access_token(&self, access_token: &str) -> Arc<dyn KitApi>;
}
