//! # API REST
//!
//! REST API implementation for VidaPlus.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, status mapping, CORS)
//!
//! Workflow logic lives in `vidaplus-core`; this crate only translates
//! between HTTP and the core services.

#![warn(rust_2018_idioms)]

pub mod dto;
