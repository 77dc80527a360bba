// SPDX-FileCopyrightText: 2026 Kitfn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementation of the [`KitApi`](kitfn_core::KitApi) collaborator.

pub mod client;

pub use client::{ApiSettings, HttpKitApi};
