// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! boring-ci daemon library
//!
//! This module exposes the line protocol for use by CLI clients.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod protocol;

pub use protocol::{
    Command, ProtocolError, DEFAULT_SOCKET_PATH, MAX_LINE_LEN, PING, PONG, SUCCESS, UNKNOWN_COMMAND,
    WATCH, WATCH_LIMIT,
};
