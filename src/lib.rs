//! linklens - client library and CLI for the URL analyzer service
//!
//! The service fetches a web page, summarizes it and lets the user ask an AI
//! questions about its content. This library provides the client side:
//! session handling, a typed API façade and headless view controllers.
//!
//! # Architecture
//!
//! Requests flow in one direction: views → façade → HTTP client → session
//! (credential read) → remote service. Responses flow back normalized into
//! [`ApiResponse`] before a view sees them.
//!
//! - `session`: persisted bearer credential and signed-in profile
//! - `api`: HTTP client wrapper, shared classifier, delete retry, façade
//! - `views`: controllers returning navigation/toast/reload effects
//! - `validation`: client-side form validation
//! - `models`: wire types
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`, `commands`: the terminal front-end
//!
//! # Example
//!
//! ```no_run
//! use linklens::{ApiClient, Config, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let session = Session::from_config(&config.session)?;
//!     let client = ApiClient::new(&config, session)?;
//!     let records = client.list_urls().await;
//!     if records.is_auth_error() {
//!         println!("Please log in again");
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod validation;
pub mod views;

// Re-export commonly used types
pub use api::{ApiClient, ApiFailure, ApiResponse, FailureKind};
pub use config::Config;
pub use error::{LinklensError, Result};
pub use session::Session;
pub use views::{Route, ViewEffect, ViewUpdate};

#[cfg(test)]
pub mod test_utils;
