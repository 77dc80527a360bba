// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kitfn respond`: build a session and print its response body.

use std::path::Path;

use kitfn_config::KitConfig;
use kitfn_core::KitError;
use kitfn_session::KitSession;
use serde_json::Value;
use tracing::info;

use crate::{read_json, read_request};

pub async fn run_respond(
    config: &KitConfig,
    request_path: &Path,
    data_path: Option<&Path>,
    load: bool,
) -> Result<(), KitError> {
    let request = read_request(request_path)?;
    let data = data_path.map(read_json).transpose()?.unwrap_or(Value::Null);

    let mut session = KitSession::connect(&request, config)?;
    info!(kind = %session.event_kind(), "session ready");

    if load {
        session.load_databases().await;
    }

    let body = session.get_response_body(data);
    let rendered = serde_json::to_string_pretty(&body)
        .map_err(|e| KitError::Internal(format!("failed to render response body: {e}")))?;
    println!("{rendered}");
    Ok(())
}
