// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! reqwest client for the platform API.
//!
//! Every call is a `POST {base}{path}?domain=..&access_token=..` with a JSON
//! body; the JSON response body is handed back undecoded beyond `Value`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kitfn_config::model::ApiConfig;
use kitfn_core::{KitApi, KitError};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

/// Connection settings resolved from request headers and configuration.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Host (`kitapi-eu.voximplant.com`) or full base URL
    /// (`http://127.0.0.1:8080`).
    pub api_url: String,
    pub domain: String,
    pub access_token: String,
    /// Use plain `http` for bare hosts.
    pub test_mode: bool,
    pub timeout: Duration,
}

impl ApiSettings {
    /// Settings for `domain`/`access_token` with transport options from config.
    pub fn from_config(
        config: &ApiConfig,
        api_url: impl Into<String>,
        domain: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            domain: domain.into(),
            access_token: access_token.into(),
            test_mode: config.test_mode,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn base_url(&self) -> String {
        let trimmed = self.api_url.trim_end_matches('/');
        if trimmed.contains("://") {
            trimmed.to_string()
        } else if self.test_mode {
            format!("http://{trimmed}")
        } else {
            format!("https://{trimmed}")
        }
    }
}

/// Platform API client.
#[derive(Debug, Clone)]
pub struct HttpKitApi {
    client: reqwest::Client,
    base_url: String,
    domain: String,
    access_token: String,
}

impl HttpKitApi {
    /// Builds a client. Fails only if the TLS backend cannot be initialized.
    pub fn new(settings: ApiSettings) -> Result<Self, KitError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| KitError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: settings.base_url(),
            domain: settings.domain,
            access_token: settings.access_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, KitError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| KitError::Config(format!("invalid api url for {path}: {e}")))?;
        url.query_pairs_mut()
            .append_pair("domain", &self.domain)
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }
}

#[async_trait]
impl KitApi for HttpKitApi {
    fn name(&self) -> &str {
        "http"
    }

    async fn request(&self, path: &str, payload: Value) -> Result<Value, KitError> {
        let url = self.endpoint(path)?;

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| KitError::Transport {
                message: format!("request to {path} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(path, status = %status, "api response received");

        let body = response.text().await.map_err(|e| KitError::Transport {
            message: format!("failed to read response body from {path}: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(KitError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| KitError::decode(format!("response from {path} is not JSON"), e))
    }

    fn with_access_token(&self, access_token: &str) -> Arc<dyn KitApi> {
        Arc::new(Self {
            access_token: access_token.to_string(),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(api_url: &str) -> ApiSettings {
        ApiSettings {
            api_url: api_url.to_string(),
            domain: "acme".into(),
            access_token: "tok-1".into(),
            test_mode: false,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn bare_host_gets_scheme_from_test_mode() {
        let mut s = settings("kitapi-eu.voximplant.com/");
        assert_eq!(s.base_url(), "https://kitapi-eu.voximplant.com");
        s.test_mode = true;
        assert_eq!(s.base_url(), "http://kitapi-eu.voximplant.com");
    }

    #[test]
    fn from_config_copies_transport_options() {
        let config = ApiConfig {
            timeout_secs: 7,
            test_mode: true,
            ..ApiConfig::default()
        };
        let s = ApiSettings::from_config(&config, "localhost:9000", "acme", "tok");
        assert_eq!(s.timeout, Duration::from_secs(7));
        assert_eq!(s.base_url(), "http://localhost:9000");
    }

    #[tokio::test]
    async fn request_posts_json_with_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/kv/get"))
            .and(query_param("domain", "acme"))
            .and(query_param("access_token", "tok-1"))
            .and(body_json(json!({"key": "accountdb_acme"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "{}"})))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpKitApi::new(settings(&server.uri())).unwrap();
        let data = api
            .request("/v2/kv/get", json!({"key": "accountdb_acme"}))
            .await
            .unwrap();
        assert_eq!(data, json!({"result": "{}"}));
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let api = HttpKitApi::new(settings(&server.uri())).unwrap();
        let err = api.request("/v2/kv/put", json!({})).await.unwrap_err();
        match err {
            KitError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "forbidden");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_body_is_null() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let api = HttpKitApi::new(settings(&server.uri())).unwrap();
        let data = api.request("/v2/kv/put", json!({})).await.unwrap();
        assert!(data.is_null());
    }

    #[tokio::test]
    async fn invalid_json_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let api = HttpKitApi::new(settings(&server.uri())).unwrap();
        let err = api.request("/v2/kv/get", json!({})).await.unwrap_err();
        assert!(matches!(err, KitError::Decode { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let api = HttpKitApi::new(settings("http://127.0.0.1:9")).unwrap();
        let err = api.request("/v2/kv/get", json!({})).await.unwrap_err();
        assert!(matches!(err, KitError::Transport { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn with_access_token_rebinds_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(query_param("access_token", "tok-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpKitApi::new(settings(&server.uri())).unwrap();
        let rebound = api.with_access_token("tok-2");
        let data = rebound.request("/v2/phone/sendSms", json!({})).await.unwrap();
        assert_eq!(data["ok"], true);
    }
}
