// ABOUTME: Utility modules for common functionality across the application
// ABOUTME: Shared HTTP client configuration and LLM output recovery helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

/// HTTP client configuration and helpers
pub mod http_client;
/// JSON extraction from chatty LLM output
pub mod json_extract;
