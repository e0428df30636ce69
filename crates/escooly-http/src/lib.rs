//! escooly-http - HTTP client adapter and session management.
//!
//! One [`ApiClient`] is built at startup and shared by every repository.
//! [`AuthRepository`] maps login, logout, refresh and profile intents onto
//! the backend endpoints, and [`SessionManager`] keeps the in-memory auth
//! state in step with the persistent store.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use escooly_core::{ApiUrl, MemoryStore, TracingNotifier};
//! use escooly_http::{ApiClient, ClientConfig, SessionManager};
//!
//! # async fn example() -> Result<(), escooly_core::Error> {
//! let config = ClientConfig::new(ApiUrl::new("http://localhost:8000")?);
//! let client = ApiClient::new(config, Arc::new(MemoryStore::new()), Arc::new(TracingNotifier))?;
//! let session = SessionManager::new(client);
//!
//! session.restore().await;
//! if !session.is_authenticated() {
//!     session.login("a@b.com", "secret12").await?;
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod encode;
mod endpoints;
mod failure;
mod manager;
mod repository;

pub use client::{ApiClient, ApiRequest};
pub use config::ClientConfig;
pub use endpoints::AuthResponse;
pub use manager::SessionManager;
pub use repository::AuthRepository;

pub use reqwest::Method;
