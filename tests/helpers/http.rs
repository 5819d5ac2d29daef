// ABOUTME: In-process HTTP driver for exercising the assembled router in tests
// ABOUTME: Sends requests through tower::oneshot and reads bodies eagerly for assertions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

/// One request against the router, executed without binding a socket
pub struct ApiRequest {
    method: Method,
    uri: String,
    body: Option<String>,
}

impl ApiRequest {
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(Method::DELETE, uri)
    }

    fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body: None,
        }
    }

    /// Attach a JSON body; the content type header follows automatically
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_string(body).expect("request body must serialize"));
        self
    }

    /// Drive the request through the router and read the whole reply
    pub async fn send(self, app: Router) -> ApiResponse {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        if self.body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(Body::from(self.body.unwrap_or_default()))
            .expect("request must build");

        let response = app.oneshot(request).await.expect("router must answer");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body must read")
            .to_vec();
        ApiResponse { status, body }
    }
}

/// Fully-read response with decoding shortcuts
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    pub const fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "response body must be JSON, got error {e} for: {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    /// The body as a loose JSON value, the workhorse for wire assertions
    pub fn value(&self) -> Value {
        self.json()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body must be UTF-8")
    }
}
