//! # Gantt Client Library
//!
//! Client-side state for the task tracker: an HTTP client for the API, a
//! local cache that mirrors the server, the state controller that mediates
//! between the two, and the timeline view model rendered by the CLI.
//!
//! ## Modules
//!
//! - `api`: `TaskApi` trait and its reqwest implementation
//! - `cache`: Local task cache (JSON file or memory)
//! - `config`: Environment configuration for the CLI
//! - `controller`: Server-authoritative task list for one viewer
//! - `error`: Client error type
//! - `timeline`: Rows, bar styles and text rendering
//!
//! ## Example
//!
//! ```no_run
//! use gantt_client::api::HttpTaskApi;
//! use gantt_client::cache::MemoryCache;
//! use gantt_client::controller::{ClientStateController, ViewScope};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), gantt_client::error::ClientError> {
//! let api = HttpTaskApi::new("http://localhost:5000/api")?;
//! let mut controller = ClientStateController::new(
//!     Arc::new(api),
//!     Arc::new(MemoryCache::new()),
//!     "Alice",
//!     ViewScope::Individual,
//! );
//! controller.load().await;
//! println!("{} visible tasks", controller.visible_tasks().len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod timeline;
