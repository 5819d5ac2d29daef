// ABOUTME: Shared helpers for integration tests
// ABOUTME: Exports the in-process HTTP driver, provider doubles, and store seeding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

pub mod http;
pub mod seed;
pub mod stubs;
