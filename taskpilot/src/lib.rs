//! # TaskPilot
//!
//! Client library for the TaskPilot backend: authentication, transparent
//! access-token refresh, typed resource facades and streaming channels.
//!
//! ## Architecture
//!
//! Consumers never handle token lifecycle. A call flows through:
//!
//! - **Facades** ([`api`]): typed operations on auth, projects, tasks,
//!   chats and notifications
//! - **Coordinator** ([`net::Coordinator`]): on a 401, exchanges the refresh
//!   token once and replays the request once
//! - **Dispatcher** ([`net::Dispatcher`]): one HTTP call with the bearer
//!   token attached
//! - **Credential store** ([`store`]): persisted tokens and profile
//!
//! Streaming connections are opened by [`net::ChannelFactory`].
//!
//! ## Example
//!
//! ```no_run
//! use taskpilot::{ClientConfig, TaskPilotClient, models::LoginRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env(None)?;
//!     let client = TaskPilotClient::new(&config);
//!
//!     client
//!         .auth()
//!         .login(&LoginRequest {
//!             email: "ada@example.com".to_string(),
//!             password: "Secret123!".to_string(),
//!         })
//!         .await?;
//!
//!     for project in client.projects().list().await? {
//!         println!("{}: {}", project.id, project.name);
//!     }
//!     Ok(())
//! }
//! ```

/// Resource facades over the request pipeline.
pub mod api;

/// Wiring of the whole client.
pub mod client;

/// Environment-driven configuration.
pub mod config;

/// Wire types for the backend's resources.
pub mod models;

/// Request pipeline and streaming channels.
pub mod net;

/// Persisted credentials.
pub mod store;

pub use client::TaskPilotClient;
pub use config::{ClientConfig, ConfigError};
pub use net::{ApiError, ApiResult, ErrorKind};
