// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory scopes with join-all load and commit.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use futures::future::join_all;
use kitfn_core::{KitApi, KitError, Scope};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::keys::ScopeKeys;

/// Path of the KV read endpoint.
pub const KV_GET_PATH: &str = "/v2/kv/get";
/// Path of the KV write endpoint.
pub const KV_PUT_PATH: &str = "/v2/kv/put";

/// TTL that keeps a written blob forever.
const NO_EXPIRY: i64 = -1;

/// Contents of one scope.
pub type ScopeMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq)]
struct Scopes {
    function: ScopeMap,
    global: ScopeMap,
    conversation: ScopeMap,
}

impl Scopes {
    fn get(&self, scope: Scope) -> &ScopeMap {
        match scope {
            Scope::Function => &self.function,
            Scope::Global => &self.global,
            Scope::Conversation => &self.conversation,
        }
    }

    fn get_mut(&mut self, scope: Scope) -> &mut ScopeMap {
        match scope {
            Scope::Function => &mut self.function,
            Scope::Global => &mut self.global,
            Scope::Conversation => &mut self.conversation,
        }
    }
}

/// Outcome of writing one scope.
#[derive(Debug)]
pub struct ScopeWrite {
    pub scope: Scope,
    pub key: String,
    pub result: Result<(), KitError>,
}

/// Per-scope outcomes of a [`ScopedStore::commit`].
#[derive(Debug, Default)]
pub struct CommitReport {
    pub writes: Vec<ScopeWrite>,
}

impl CommitReport {
    /// True when every attempted write succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.writes.iter().all(|w| w.result.is_ok())
    }

    /// Scopes whose write failed.
    pub fn failed_scopes(&self) -> Vec<Scope> {
        self.writes
            .iter()
            .filter(|w| w.result.is_err())
            .map(|w| w.scope)
            .collect()
    }
}

/// Three-scope key-value store.
///
/// Reads and writes only touch memory. Remote traffic happens in
/// [`load`](Self::load) and [`commit`](Self::commit), both of which may be
/// called any number of times.
pub struct ScopedStore {
    api: Arc<dyn KitApi>,
    scopes: Scopes,
    ttl: i64,
}

impl ScopedStore {
    /// An empty store talking to `api`.
    pub fn new(api: Arc<dyn KitApi>) -> Self {
        Self {
            api,
            scopes: Scopes::default(),
            ttl: NO_EXPIRY,
        }
    }

    /// Overrides the TTL sent with every write.
    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replaces the API client used by later loads and commits.
    pub fn set_api(&mut self, api: Arc<dyn KitApi>) {
        self.api = api;
    }

    /// Fetches every keyed scope concurrently and swaps the results in once
    /// all fetches have finished.
    ///
    /// A failed, empty or undecodable fetch yields an empty scope. Scopes
    /// without a key are reset to empty as well.
    pub async fn load(&mut self, keys: &ScopeKeys) {
        let this = &*self;
        let fetched = join_all(
            keys.iter()
                .map(|(scope, key)| async move { (scope, this.fetch(scope, key).await) }),
        )
        .await;

        let mut scopes = Scopes::default();
        for (scope, map) in fetched {
            *scopes.get_mut(scope) = map;
        }
        self.scopes = scopes;
        debug!(
            function = self.scopes.function.len(),
            global = self.scopes.global.len(),
            conversation = self.scopes.conversation.len(),
            "scopes loaded"
        );
    }

    async fn fetch(&self, scope: Scope, key: &str) -> ScopeMap {
        let data = match self.api.request(KV_GET_PATH, json!({ "key": key })).await {
            Ok(data) => data,
            Err(e) => {
                warn!(%scope, key, error = %e, "scope fetch failed, using empty scope");
                return ScopeMap::new();
            }
        };

        match decode_blob(data.get("result").unwrap_or(&Value::Null)) {
            Ok(map) => map,
            Err(e) => {
                warn!(%scope, key, error = %e, "scope blob is not a JSON object, using empty scope");
                ScopeMap::new()
            }
        }
    }

    /// Value of `key` in `scope`.
    pub fn get(&self, key: &str, scope: Scope) -> Option<&str> {
        self.scopes.get(scope).get(key).map(String::as_str)
    }

    /// Stores the string form of `value` under `key` in `scope`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Display, scope: Scope) {
        self.scopes
            .get_mut(scope)
            .insert(key.into(), value.to_string());
    }

    /// Removes `key` from `scope`, returning its previous value.
    pub fn remove(&mut self, key: &str, scope: Scope) -> Option<String> {
        self.scopes.get_mut(scope).remove(key)
    }

    /// An owned copy of `scope`.
    pub fn get_all(&self, scope: Scope) -> ScopeMap {
        self.scopes.get(scope).clone()
    }

    /// Writes every keyed scope concurrently.
    ///
    /// All writes run to completion; each failure is logged and recorded in
    /// the report without affecting the others.
    pub async fn commit(&self, keys: &ScopeKeys) -> CommitReport {
        let writes = join_all(keys.iter().map(|(scope, key)| async move {
            let payload = json!({
                "key": key,
                "value": self.scopes.get(scope),
                "ttl": self.ttl,
            });
            let result = self.api.request(KV_PUT_PATH, payload).await.map(|_| ());
            if let Err(e) = &result {
                warn!(%scope, key, error = %e, "scope write failed");
            }
            ScopeWrite {
                scope,
                key: key.to_string(),
                result,
            }
        }))
        .await;

        let report = CommitReport { writes };
        debug!(
            api = self.api.name(),
            written = report.writes.len(),
            failed = report.failed_scopes().len(),
            "scopes committed"
        );
        report
    }
}

/// Decodes a stored blob into a scope.
///
/// The platform returns blobs as JSON text; an already-decoded object is
/// accepted too. Null and empty text mean "never written".
fn decode_blob(raw: &Value) -> Result<ScopeMap, KitError> {
    let decoded;
    let object = match raw {
        Value::Null => return Ok(ScopeMap::new()),
        Value::String(text) if text.trim().is_empty() => return Ok(ScopeMap::new()),
        Value::String(text) => {
            decoded = serde_json::from_str::<Value>(text)
                .map_err(|e| KitError::decode("scope blob is not valid JSON", e))?;
            &decoded
        }
        other => other,
    };

    let Value::Object(entries) = object else {
        return Err(KitError::Decode {
            message: format!("expected a JSON object, found {object}"),
            source: None,
        });
    };

    Ok(entries
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect())
}
