// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the notification and dispatch collaborators

pub mod dispatch;
pub mod notify;
pub mod traced;

pub use dispatch::{
    ChannelDispatchAdapter, DispatchAdapter, DispatchError, DispatchRequest, NoOpDispatchAdapter,
};
pub use notify::{
    BusNotifyAdapter, NoOpNotifyAdapter, Notification, NotifyAdapter, NotifyError, ALERT,
    MISSION_RUN_UPDATED, ROBOT_UPDATED,
};
pub use traced::{TracedDispatch, TracedNotify};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use dispatch::FakeDispatchAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
