// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote blob keys for each scope.

use kitfn_core::Scope;

/// Remote key of every scope a session may touch.
///
/// `conversation` is only present for chat message sessions; a store loaded
/// or committed without it leaves the conversation scope alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeKeys {
    pub function: String,
    pub global: String,
    pub conversation: Option<String>,
}

impl ScopeKeys {
    /// Keys as the platform names them: `function_<id>`, `accountdb_<domain>`
    /// and `conversation_<uuid>`.
    pub fn for_session(function_id: &str, domain: &str, conversation_uuid: Option<&str>) -> Self {
        Self {
            function: format!("function_{function_id}"),
            global: format!("accountdb_{domain}"),
            conversation: conversation_uuid.map(|uuid| format!("conversation_{uuid}")),
        }
    }

    pub fn key_for(&self, scope: Scope) -> Option<&str> {
        match scope {
            Scope::Function => Some(&self.function),
            Scope::Global => Some(&self.global),
            Scope::Conversation => self.conversation.as_deref(),
        }
    }

    /// `(scope, key)` pairs in scope order, skipping absent keys.
    pub fn iter(&self) -> impl Iterator<Item = (Scope, &str)> {
        Scope::ALL
            .into_iter()
            .filter_map(move |scope| self.key_for(scope).map(|key| (scope, key)))
    }
}
