// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patrol daemon library
//!
//! Configuration and the socket wire format, shared with clients and tests.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod wire;

pub use config::{Config, ConfigError, Settings};
pub use wire::{decode_line, encode_line, Inbound, Outbound, WireError, MAX_LINE_BYTES};
