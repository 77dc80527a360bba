// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end session behaviour against the mock API and a wiremock server.

use std::sync::Arc;

use kitfn_config::KitConfig;
use kitfn_core::{Command, PayloadItem, QueueInfo};
use kitfn_session::{InboundRequest, KitSession};
use kitfn_test_utils::{MockKitApi, fixtures};
use proptest::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_with(raw: Value, mock: &MockKitApi) -> KitSession {
    KitSession::new(&InboundRequest::from_value(&raw), Arc::new(mock.clone()))
}

fn transfer_items(session: &KitSession) -> Vec<PayloadItem> {
    session
        .reply_message()
        .payload
        .into_iter()
        .filter(PayloadItem::is_transfer_to_queue)
        .collect()
}

// --- reply commands ---

#[test]
fn queue_without_id_or_name_is_rejected() {
    let mut session = session_with(fixtures::message_request(), &MockKitApi::new());
    let before = session.reply_message();
    assert!(!session.transfer_to_queue(QueueInfo::default()));
    assert_eq!(session.reply_message(), before);
}

#[test]
fn transfer_by_id_adds_a_single_item() {
    let mut session = session_with(fixtures::message_request(), &MockKitApi::new());
    assert!(session.transfer_to_queue(QueueInfo::by_id(5)));

    let items = transfer_items(&session);
    assert_eq!(items.len(), 1);
    let PayloadItem::Cmd(Command::TransferToQueue { queue, skills, .. }) = &items[0] else {
        panic!("expected a transfer item");
    };
    assert_eq!(queue.queue_id, Some(5));
    assert!(skills.is_empty());
}

#[test]
fn second_transfer_wins() {
    let mut session = session_with(fixtures::message_request(), &MockKitApi::new());
    assert!(session.transfer_to_queue(QueueInfo::by_id(5)));
    assert!(session.transfer_to_queue(QueueInfo::by_name("support")));

    let items = transfer_items(&session);
    assert_eq!(items.len(), 1);
    let PayloadItem::Cmd(Command::TransferToQueue { queue, .. }) = &items[0] else {
        panic!("expected a transfer item");
    };
    assert_eq!(queue, &QueueInfo::by_name("support"));
}

#[test]
fn finish_then_cancel_leaves_no_finish_item() {
    let mut session = session_with(fixtures::message_request(), &MockKitApi::new());
    assert!(session.cancel_finish_request());
    assert!(session.finish_request());
    assert!(session.cancel_finish_request());
    assert!(
        !session
            .reply_message()
            .payload
            .iter()
            .any(PayloadItem::is_finish_request)
    );
}

#[test]
fn priority_accepts_only_whole_numbers_up_to_ten() {
    let mut session = session_with(fixtures::message_request(), &MockKitApi::new());
    assert!(!session.set_priority(11));
    assert!(!session.set_priority(-1));
    assert!(!session.set_priority(3.5));
    assert_eq!(session.get_priority().get(), 0);
    assert!(session.set_priority(7));
    assert_eq!(session.get_priority().get(), 7);
}

#[test]
fn routing_set_after_transfer_is_folded_into_response() {
    let mut session = session_with(fixtures::message_request(), &MockKitApi::new());
    assert!(session.transfer_to_queue(QueueInfo::by_name("sales")));
    session.set_skill("billing", 2);
    assert!(session.set_priority(4));

    let body = session.get_response_body(Value::Null);
    let transfer = body["payload"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["name"] == "transfer_to_queue")
        .unwrap();
    assert_eq!(
        transfer["skills"],
        json!([{"skill_name": "billing", "level": 2}])
    );
    assert_eq!(transfer["priority"], 4);
}

// --- scoped store ---

#[tokio::test]
async fn store_copies_do_not_alias() {
    let mock = MockKitApi::new();
    let mut session = session_with(fixtures::call_request(), &mock);
    session.load_databases().await;

    assert!(session.db_set("k", "v", "global"));
    let mut all = session.db_get_all("global").unwrap();
    assert_eq!(all.get("k").map(String::as_str), Some("v"));

    all.insert("k".into(), "changed".into());
    assert_eq!(session.db_get("k", "global").as_deref(), Some("v"));
}

#[tokio::test]
async fn load_with_every_fetch_failing_yields_empty_scopes() {
    let mock = MockKitApi::new().failing();
    let mut session = session_with(fixtures::message_request(), &mock);
    session.load_databases().await;

    for scope in ["function", "global", "conversation"] {
        assert_eq!(session.db_get_all(scope), Some(Default::default()));
    }
    assert_eq!(mock.calls_to("/v2/kv/get").len(), 3);
}

#[tokio::test]
async fn call_sessions_never_touch_the_conversation_scope() {
    let mock = MockKitApi::new();
    let mut session = session_with(fixtures::call_request(), &mock);
    session.load_databases().await;
    assert!(session.db_commit().await);

    let keys: Vec<String> = mock
        .calls()
        .iter()
        .filter_map(|c| c.payload["key"].as_str().map(str::to_string))
        .collect();
    assert_eq!(keys.len(), 4);
    assert!(keys.iter().all(|k| !k.starts_with("conversation_")));
}

#[tokio::test]
async fn commit_then_reload_round_trips_through_the_remote_blobs() {
    let mock = MockKitApi::new().with_blob("accountdb_acme", r#"{"plan":"pro","seats":4}"#);

    let mut first = session_with(fixtures::message_request(), &mock);
    first.load_databases().await;
    assert_eq!(first.db_get("seats", "global").as_deref(), Some("4"));
    first.db_set("visits", 1, "conversation");
    first.db_set("greeted", true, "function");
    assert!(first.db_commit().await);

    let put = mock.calls_to("/v2/kv/put");
    assert_eq!(put.len(), 3);
    assert!(put.iter().all(|c| c.payload["ttl"] == -1));
    assert_eq!(
        mock.blob("conversation_5d3b4c2a-conv"),
        Some(json!({"visits": "1"}))
    );

    let mut second = session_with(fixtures::message_request(), &mock);
    second.load_databases().await;
    assert_eq!(second.db_get("visits", "conversation").as_deref(), Some("1"));
    assert_eq!(second.db_get("greeted", "function").as_deref(), Some("true"));
    assert_eq!(second.db_get("plan", "global").as_deref(), Some("pro"));
}

#[tokio::test]
async fn one_failing_write_does_not_stop_the_others() {
    let mock = MockKitApi::new().failing_key("function_17");
    let mut session = session_with(fixtures::message_request(), &mock);
    session.db_set("k", "v", "global");

    assert!(!session.db_commit().await);
    assert_eq!(mock.calls_to("/v2/kv/put").len(), 3);
    assert_eq!(mock.blob("accountdb_acme"), Some(json!({"k": "v"})));
}

// --- HTTP collaborator ---

#[tokio::test]
async fn connected_session_talks_to_the_platform_api() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/kv/get"))
        .and(query_param("domain", fixtures::DOMAIN))
        .and(query_param("access_token", "fixture-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "{\"vip\":\"yes\"}"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/kv/put"))
        .and(body_partial_json(json!({"key": "function_17", "ttl": -1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/kv/put"))
        .and(body_partial_json(json!({"key": "accountdb_acme"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage down"))
        .expect(1)
        .mount(&server)
        .await;

    let mut raw = fixtures::call_request();
    raw["headers"]["x-kit-api-url"] = json!(server.uri());
    let request = InboundRequest::from_value(&raw);

    let mut session = KitSession::connect(&request, &KitConfig::default()).unwrap();
    session.load_databases().await;
    assert_eq!(session.db_get("vip", "function").as_deref(), Some("yes"));
    assert_eq!(session.db_get("vip", "global").as_deref(), Some("yes"));

    assert!(!session.db_commit().await);
}

#[tokio::test]
async fn connected_session_falls_back_to_configured_host() {
    let mut raw = fixtures::webhook_request(json!({}));
    raw["headers"]
        .as_object_mut()
        .unwrap()
        .remove("x-kit-api-url");
    let mut config = KitConfig::default();
    config.api.default_url = "kit.internal.test".into();

    let session = KitSession::connect(&InboundRequest::from_value(&raw), &config).unwrap();
    assert_eq!(session.identity().api_url, "kit.internal.test");
}

// --- properties ---

proptest! {
    #[test]
    fn set_then_get_variable_round_trips(name in "[a-z_]{1,16}", value in ".{0,32}") {
        let mut session = session_with(fixtures::webhook_request(json!({})), &MockKitApi::new());
        prop_assert!(session.set_variable(name.clone(), value.clone()));
        prop_assert_eq!(session.get_variable(&name), Some(value));
        prop_assert!(session.delete_variable(&name));
        prop_assert_eq!(session.get_variable(&name), None);
    }

    #[test]
    fn repeated_set_skill_keeps_one_entry(name in "[a-z]{1,12}", first in -5i64..50, second in -5i64..50) {
        let mut session = session_with(fixtures::call_request(), &MockKitApi::new());
        session.set_skill(name.clone(), first);
        session.set_skill(name.clone(), second);

        let matching: Vec<_> = session
            .get_skills()
            .into_iter()
            .filter(|s| s.skill_name == name)
            .collect();
        prop_assert_eq!(matching.len(), 1);
        prop_assert_eq!(matching[0].level, second);
    }
}
