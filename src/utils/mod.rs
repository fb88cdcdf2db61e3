// ABOUTME: Utility module for shared helpers used across the server
// ABOUTME: Currently hosts outbound HTTP client construction
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Outbound HTTP client construction
pub mod http_client;
