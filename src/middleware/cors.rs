// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Provides Cross-Origin Resource Sharing setup for web client access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

use http::{HeaderValue, Method, header::HeaderName};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Configure CORS settings for the API server
///
/// Origins come from `ServerConfig::cors_origins` (the `CORS_ORIGINS`
/// environment variable). A single `*` entry or an empty list allows any
/// origin, intended for development only; production deployments list
/// the frontend origins explicitly.
///
/// # Examples
///
/// ```bash
/// # Allow all origins (development)
/// export CORS_ORIGINS="*"
///
/// # Allow specific origins (production)
/// export CORS_ORIGINS="http://localhost:3000,https://ournold.vercel.app"
/// ```
pub fn setup_cors(config: &crate::config::environment::ServerConfig) -> CorsLayer {
    let allow_origin = if config.cors_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();

        if origins.is_empty() {
            // Every configured origin failed to parse as a header value
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("access-control-request-method"),
            HeaderName::from_static("access-control-request-headers"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
}
