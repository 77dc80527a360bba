// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kitfn inspect`: show how a request is classified.

use std::path::Path;

use kitfn_config::KitConfig;
use kitfn_core::KitError;
use kitfn_session::ParsedEvent;
use serde_json::{Value, json};

use crate::read_request;

pub fn run_inspect(config: &KitConfig, request_path: &Path) -> Result<(), KitError> {
    let request = read_request(request_path)?;
    let event = ParsedEvent::parse_with(&request, &config.api.default_url);

    let rendered = serde_json::to_string_pretty(&summarize(&event))
        .map_err(|e| KitError::Internal(format!("failed to render summary: {e}")))?;
    println!("{rendered}");
    Ok(())
}

/// Kind, identity and scope keys of `event`. The access token is masked.
fn summarize(event: &ParsedEvent) -> Value {
    let identity = event.identity();
    let keys = event.scope_keys();
    let token = if identity.access_token.is_empty() {
        ""
    } else {
        "***"
    };

    json!({
        "kind": event.kind().as_str(),
        "identity": {
            "api_url": identity.api_url,
            "domain": identity.domain,
            "function_id": identity.function_id,
            "session_access_url": identity.session_access_url,
            "access_token": token,
        },
        "scope_keys": {
            "function": keys.function,
            "global": keys.global,
            "conversation": keys.conversation,
        },
        "variables": event.initial_variables(),
    })
}
