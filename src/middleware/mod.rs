// ABOUTME: HTTP middleware configuration for the API surface
// ABOUTME: Cross-origin resource sharing setup for browser clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

pub mod cors;

pub use cors::setup_cors;
