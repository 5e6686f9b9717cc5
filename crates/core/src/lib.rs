// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bci-core: build records shared by the boring-ci daemon and CLI

pub mod id;
pub mod record;
pub mod status;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use id::BuildId;
pub use record::{Build, BuildRequest};
pub use status::{BuildStatus, ParseStatusError};
pub use time_fmt::{format_elapsed, format_timestamp, parse_timestamp, TimestampError};
