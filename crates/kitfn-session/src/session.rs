// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The mutable per-invocation session.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use kitfn_api::{ApiSettings, HttpKitApi};
use kitfn_config::KitConfig;
use kitfn_core::{
    CallInfo, EventKind, IncomingMessage, InvalidPriority, KitApi, KitError, Priority, QueueInfo,
    ReplyMessage, Scope, Skill,
};
use kitfn_store::{ScopeKeys, ScopeMap, ScopedStore};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::event::{Identity, ParsedEvent};
use crate::reply::{ReplyAssembler, remove_by, upsert_by};
use crate::request::InboundRequest;

/// Path of the SMS endpoint used by [`KitSession::send_sms`].
pub const SEND_SMS_PATH: &str = "/v2/phone/sendSms";

/// State of one function invocation.
///
/// Built once from an [`InboundRequest`]; everything except the scoped store
/// is available immediately. Call [`load_databases`](Self::load_databases)
/// before reading the store and [`db_commit`](Self::db_commit) to persist it.
pub struct KitSession {
    pub(crate) event: ParsedEvent,
    pub(crate) variables: BTreeMap<String, String>,
    pub(crate) skills: Vec<Skill>,
    pub(crate) priority: Priority,
    pub(crate) reply: ReplyAssembler,
    store: ScopedStore,
    api: Arc<dyn KitApi>,
    scope_keys: ScopeKeys,
}

impl KitSession {
    /// Parses `request` and builds a session talking to `api`.
    pub fn new(request: &InboundRequest, api: Arc<dyn KitApi>) -> Self {
        Self::from_event(ParsedEvent::parse(request), api)
    }

    /// Builds a session from an already parsed event.
    pub fn from_event(event: ParsedEvent, api: Arc<dyn KitApi>) -> Self {
        let variables = event.initial_variables();
        let skills = event
            .call_body()
            .map(|body| body.skills.clone())
            .unwrap_or_default();
        let reply = event
            .message()
            .map(ReplyAssembler::for_message)
            .unwrap_or_default();

        let scope_keys = event.scope_keys();
        if event.kind().is_incoming_message() && scope_keys.conversation.is_none() {
            warn!("incoming message has no conversation uuid, conversation scope disabled");
        }

        debug!(
            kind = %event.kind(),
            domain = %event.identity().domain,
            function_id = %event.identity().function_id,
            "session created"
        );

        Self {
            store: ScopedStore::new(Arc::clone(&api)),
            event,
            variables,
            skills,
            priority: Priority::default(),
            reply,
            api,
            scope_keys,
        }
    }

    /// Builds a session backed by [`HttpKitApi`], resolving the API host from
    /// the request headers and transport options from `config`.
    pub fn connect(request: &InboundRequest, config: &KitConfig) -> Result<Self, KitError> {
        let event = ParsedEvent::parse_with(request, &config.api.default_url);
        let identity = event.identity();
        let settings = ApiSettings::from_config(
            &config.api,
            identity.api_url.as_str(),
            identity.domain.as_str(),
            identity.access_token.as_str(),
        );
        let api: Arc<dyn KitApi> = Arc::new(HttpKitApi::new(settings)?);

        let mut session = Self::from_event(event, api);
        session.store = ScopedStore::new(Arc::clone(&session.api)).with_ttl(config.store.ttl);
        Ok(session)
    }

    pub fn event(&self) -> &ParsedEvent {
        &self.event
    }

    pub fn event_kind(&self) -> &EventKind {
        self.event.kind()
    }

    pub fn identity(&self) -> &Identity {
        self.event.identity()
    }

    pub fn scope_keys(&self) -> &ScopeKeys {
        &self.scope_keys
    }

    pub fn access_token(&self) -> &str {
        &self.event.identity().access_token
    }

    pub fn domain(&self) -> &str {
        &self.event.identity().domain
    }

    pub fn function_id(&self) -> &str {
        &self.event.identity().function_id
    }

    pub fn session_access_url(&self) -> &str {
        &self.event.identity().session_access_url
    }

    // --- scoped store ---

    /// Fetches every scope of this session. Failed scopes come back empty.
    pub async fn load_databases(&mut self) {
        self.store.load(&self.scope_keys).await;
    }

    /// Writes every scope of this session. True only if all writes succeeded.
    pub async fn db_commit(&self) -> bool {
        let report = self.store.commit(&self.scope_keys).await;
        report.all_succeeded()
    }

    /// Value of `key` in the scope named `scope`.
    pub fn db_get(&self, key: &str, scope: &str) -> Option<String> {
        let scope = parse_scope(scope)?;
        self.store.get(key, scope).map(str::to_string)
    }

    /// Stores `value` under `key`. Returns `false` for an unknown scope name.
    pub fn db_set(&mut self, key: impl Into<String>, value: impl Display, scope: &str) -> bool {
        let Some(scope) = parse_scope(scope) else {
            return false;
        };
        self.store.set(key, value, scope);
        true
    }

    /// A copy of the scope named `scope`.
    pub fn db_get_all(&self, scope: &str) -> Option<ScopeMap> {
        parse_scope(scope).map(|scope| self.store.get_all(scope))
    }

    pub fn store(&self) -> &ScopedStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ScopedStore {
        &mut self.store
    }

    // --- variables ---

    pub fn get_variable(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        self.variables.insert(name.into(), value.into());
        true
    }

    /// Removes a variable, returning whether it existed.
    pub fn delete_variable(&mut self, name: &str) -> bool {
        self.variables.remove(name).is_some()
    }

    pub fn get_variables(&self) -> BTreeMap<String, String> {
        self.variables.clone()
    }

    // --- call data ---

    pub fn get_call_data(&self) -> Option<CallInfo> {
        self.event.call_body().and_then(|body| body.call.clone())
    }

    pub fn get_call_headers(&self) -> Option<Map<String, Value>> {
        self.event.call_body().and_then(|body| body.headers.clone())
    }

    pub fn get_incoming_message(&self) -> Option<IncomingMessage> {
        self.event.message().cloned()
    }

    // --- routing ---

    pub fn get_skills(&self) -> Vec<Skill> {
        self.skills.clone()
    }

    /// Adds `name` at `level`, or changes the level of an existing skill.
    pub fn set_skill(&mut self, name: impl Into<String>, level: i64) -> bool {
        let name = name.into();
        upsert_by(
            &mut self.skills,
            |skill| skill.skill_name == name,
            || Skill {
                skill_name: name.clone(),
                level,
            },
            |skill| skill.level = level,
        );
        true
    }

    pub fn remove_skill(&mut self, name: &str) -> bool {
        remove_by(&mut self.skills, |skill| skill.skill_name == name)
    }

    /// Sets the routing priority. Anything other than an integer from 0 to 10
    /// is rejected with a warning and the previous priority is kept.
    pub fn set_priority<P>(&mut self, value: P) -> bool
    where
        P: TryInto<Priority, Error = InvalidPriority>,
    {
        match value.try_into() {
            Ok(priority) => {
                self.priority = priority;
                true
            }
            Err(e) => {
                warn!(error = %e, current = %self.priority, "priority rejected");
                false
            }
        }
    }

    pub fn get_priority(&self) -> Priority {
        self.priority
    }

    // --- reply ---

    /// Ends the current chat request. Only valid for message events.
    pub fn finish_request(&mut self) -> bool {
        if !self.event.kind().is_incoming_message() {
            return false;
        }
        self.reply.finish_request();
        true
    }

    pub fn cancel_finish_request(&mut self) -> bool {
        self.reply.cancel_finish_request();
        true
    }

    /// Routes the conversation to `queue`. Only valid for message events and
    /// a queue with an id or a name.
    pub fn transfer_to_queue(&mut self, queue: QueueInfo) -> bool {
        if !self.event.kind().is_incoming_message() {
            return false;
        }
        self.reply.transfer_to_queue(queue)
    }

    pub fn cancel_transfer_to_queue(&mut self) -> bool {
        self.reply.cancel_transfer_to_queue();
        true
    }

    pub fn add_photo(&mut self, url: impl Into<String>) -> bool {
        self.reply.add_photo(url);
        true
    }

    pub fn set_reply_text(&mut self, text: impl Into<String>) {
        self.reply.set_text(text);
    }

    /// A copy of the reply assembled so far.
    pub fn reply_message(&self) -> ReplyMessage {
        self.reply.message().clone()
    }

    // --- platform API ---

    /// Rebinds the session and its store to a new access token.
    pub fn set_access_token(&mut self, access_token: &str) {
        self.api = self.api.with_access_token(access_token);
        self.store.set_api(Arc::clone(&self.api));
        debug!(api = self.api.name(), "access token replaced");
    }

    /// Sends an SMS. Returns the API response, or `None` if the call failed.
    pub async fn send_sms(&self, source: &str, destination: &str, sms_body: &str) -> Option<Value> {
        self.api_proxy(
            SEND_SMS_PATH,
            json!({
                "source": source,
                "destination": destination,
                "sms_body": sms_body,
            }),
        )
        .await
    }

    /// Calls an arbitrary API path. Returns `None` if the call failed.
    pub async fn api_proxy(&self, path: &str, data: Value) -> Option<Value> {
        match self.api.request(path, data).await {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(path, error = %e, "api call failed");
                None
            }
        }
    }

    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

fn parse_scope(name: &str) -> Option<Scope> {
    match Scope::from_str(name) {
        Ok(scope) => Some(scope),
        Err(_) => {
            debug!(scope = name, "unknown scope name");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitfn_test_utils::{MockKitApi, fixtures};
    use tracing_test::traced_test;

    fn session(raw: Value) -> (KitSession, MockKitApi) {
        let mock = MockKitApi::new();
        let session = KitSession::new(&InboundRequest::from_value(&raw), Arc::new(mock.clone()));
        (session, mock)
    }

    #[test]
    fn call_session_exposes_call_data() {
        let (session, _) = session(fixtures::call_request());
        assert_eq!(session.get_call_data().unwrap().id, Some(901));
        assert_eq!(session.get_call_headers().unwrap()["X-Custom"], "yes");
        assert!(session.get_incoming_message().is_none());
        assert_eq!(session.get_skills()[0].skill_name, "english");
        assert_eq!(session.function_id(), fixtures::FUNCTION_ID);
    }

    #[test]
    fn message_session_has_no_call_data() {
        let (session, _) = session(fixtures::message_request());
        assert!(session.get_call_data().is_none());
        assert!(session.get_call_headers().is_none());
        assert!(session.get_skills().is_empty());
        assert_eq!(
            session.get_incoming_message().unwrap().text,
            "I need help with my bill"
        );
    }

    #[test]
    fn returned_variables_are_copies() {
        let (mut session, _) = session(fixtures::call_request());
        let mut copy = session.get_variables();
        copy.insert("lang".into(), "de".into());
        assert_eq!(session.get_variable("lang").as_deref(), Some("en"));

        assert!(session.delete_variable("lang"));
        assert!(!session.delete_variable("lang"));
        assert_eq!(session.get_variable("lang"), None);
    }

    #[test]
    fn commands_are_refused_outside_message_events() {
        let (mut session, _) = session(fixtures::call_request());
        assert!(!session.finish_request());
        assert!(!session.transfer_to_queue(QueueInfo::by_id(1)));
        assert!(session.cancel_finish_request());
        assert!(session.cancel_transfer_to_queue());
        assert!(session.add_photo("https://img.test/x.png"));
        assert_eq!(session.reply_message().payload.len(), 1);
    }

    #[test]
    #[traced_test]
    fn rejected_priority_is_logged() {
        let (mut session, _) = session(fixtures::message_request());
        assert!(session.set_priority(6));
        assert!(!session.set_priority(3.5));
        assert_eq!(session.get_priority().get(), 6);
        assert!(logs_contain("priority rejected"));
    }

    #[test]
    fn unknown_scope_names_are_refused() {
        let (mut session, _) = session(fixtures::call_request());
        assert!(!session.db_set("k", "v", "account"));
        assert_eq!(session.db_get("k", "account"), None);
        assert_eq!(session.db_get_all("account"), None);
        assert!(session.db_set("k", 42, "function"));
        assert_eq!(session.db_get("k", "function").as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn access_token_rebinds_store_and_proxy() {
        let (mut session, mock) = session(fixtures::call_request());
        session.set_access_token("rotated");

        session.load_databases().await;
        let sent = session.send_sms("15550001", "15550002", "hi").await;
        assert_eq!(sent, Some(json!({"result": null})));

        let calls = mock.calls();
        assert!(!calls.is_empty());
        assert!(calls.iter().all(|c| c.access_token == "rotated"));
        let sms = mock.calls_to(SEND_SMS_PATH);
        assert_eq!(
            sms[0].payload,
            json!({"source": "15550001", "destination": "15550002", "sms_body": "hi"})
        );
    }

    #[tokio::test]
    async fn failed_proxy_call_returns_none() {
        let mock = MockKitApi::new().failing_path("/v2/broken");
        let session = KitSession::new(
            &InboundRequest::from_value(&fixtures::webhook_request(json!({}))),
            Arc::new(mock),
        );
        assert_eq!(session.api_proxy("/v2/broken", json!({})).await, None);
    }

    #[test]
    fn version_is_the_crate_version() {
        assert_eq!(KitSession::version(), env!("CARGO_PKG_VERSION"));
    }
}
