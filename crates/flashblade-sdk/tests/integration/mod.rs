//! Integration tests for the FlashBlade SDK.
//!
//! This module contains integration tests covering:
//! - Authentication modes and session lifecycle
//! - The retry and backoff behaviour of the dispatcher
//! - Lazy pagination
//! - Endpoint services and reference resolution
//! - The HTTPS transport against a mock server

pub mod common;
pub mod auth;
pub mod dispatch;
pub mod pagination;
pub mod services;
