//! REST client for the crowdsourcing backend.
//!
//! [`api::CrowdsourceApi`] wraps every endpoint the authoring layer uses
//! and implements the backend traits from [`crowdsource_core::remote`].
//! [`config::ClientConfig`] reads the base URL and timeout from the
//! environment.

pub mod api;
pub mod config;

pub use api::{ApiError, Category, CrowdsourceApi};
pub use config::{ClientConfig, ConfigError};
