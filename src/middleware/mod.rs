// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (member identification, task auth, security headers).

pub mod member;
pub mod security;
pub mod tasks_auth;

pub use member::{identify_member, Invoker};
pub use tasks_auth::require_tasks_auth;
