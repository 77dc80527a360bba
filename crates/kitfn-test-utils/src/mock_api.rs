// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock platform API for deterministic store and session tests.
//!
//! `/v2/kv/get` and `/v2/kv/put` are served from an in-memory blob map so a
//! commit followed by a load round-trips. Any other path answers with a
//! scripted response or `{"result": null}`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kitfn_core::{KitApi, KitError};
use serde_json::{Value, json};

/// One captured request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub payload: Value,
    pub access_token: String,
}

#[derive(Default)]
struct State {
    blobs: HashMap<String, String>,
    responses: HashMap<String, Value>,
    failing_keys: Vec<String>,
    failing_paths: Vec<String>,
    fail_everything: bool,
    calls: Vec<RecordedCall>,
}

/// A mock [`KitApi`]. Clones and rebound clients share state.
#[derive(Clone)]
pub struct MockKitApi {
    state: Arc<Mutex<State>>,
    access_token: String,
}

impl MockKitApi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            access_token: "mock-token".to_string(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("mock api state poisoned")
    }

    /// Serve `raw` as the stored blob of `key`.
    pub fn with_blob(self, key: &str, raw: &str) -> Self {
        self.state().blobs.insert(key.to_string(), raw.to_string());
        self
    }

    /// Answer requests to `path` with `data`.
    pub fn with_response(self, path: &str, data: Value) -> Self {
        self.state().responses.insert(path.to_string(), data);
        self
    }

    /// Fail every request whose payload `key` equals `key`.
    pub fn failing_key(self, key: &str) -> Self {
        self.state().failing_keys.push(key.to_string());
        self
    }

    /// Fail every request to `path`.
    pub fn failing_path(self, path: &str) -> Self {
        self.state().failing_paths.push(path.to_string());
        self
    }

    /// Fail every request.
    pub fn failing(self) -> Self {
        self.state().fail_everything = true;
        self
    }

    /// All requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Requests received for `path`.
    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    /// The blob currently stored under `key`, decoded.
    pub fn blob(&self, key: &str) -> Option<Value> {
        self.state()
            .blobs
            .get(key)
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

impl Default for MockKitApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KitApi for MockKitApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn request(&self, path: &str, payload: Value) -> Result<Value, KitError> {
        let mut state = self.state();
        state.calls.push(RecordedCall {
            path: path.to_string(),
            payload: payload.clone(),
            access_token: self.access_token.clone(),
        });

        let key = payload.get("key").and_then(Value::as_str).map(str::to_string);
        let key_fails = key
            .as_ref()
            .is_some_and(|k| state.failing_keys.iter().any(|f| f == k));
        if state.fail_everything
            || key_fails
            || state.failing_paths.iter().any(|p| p == path)
        {
            return Err(KitError::Transport {
                message: format!("mock failure for {path}"),
                source: None,
            });
        }

        match (path, key) {
            ("/v2/kv/get", Some(key)) => Ok(json!({ "result": state.blobs.get(&key) })),
            ("/v2/kv/put", Some(key)) => {
                let value = payload.get("value").cloned().unwrap_or(Value::Null);
                state.blobs.insert(key, value.to_string());
                Ok(json!({ "result": true }))
            }
            _ => Ok(state
                .responses
                .get(path)
                .cloned()
                .unwrap_or_else(|| json!({ "result": null }))),
        }
    }

    fn with_access_token(&self, access_token: &str) -> Arc<dyn KitApi> {
        Arc::new(Self {
            state: Arc::clone(&self.state),
            access_token: access_token.to_string(),
        })
    }
}
