// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Dossier chat backend.
//!
//! Exposes the public chat, health, banner and resume routes plus the
//! bearer-protected analytics and conversation inspection routes.

pub mod auth;
pub mod caller;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use caller::{CallerIdentity, caller_info};
pub use server::{GatewayState, ServerConfig, build_router, start_server};
