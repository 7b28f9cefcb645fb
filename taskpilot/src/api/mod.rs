//! Resource facades: typed wrappers over the coordinator.
//!
//! Each facade method maps one domain operation to a path, method and body
//! and runs it through the [`Coordinator`](crate::net::Coordinator). None of
//! them hold state or retry on their own. Only the auth facade touches the
//! credential store, and only to record the outcome of login, registration,
//! refresh, profile fetches and logout.

pub mod auth;
pub mod chats;
pub mod notifications;
pub mod projects;
pub mod tasks;

pub use auth::AuthApi;
pub use chats::ChatsApi;
pub use notifications::NotificationsApi;
pub use projects::ProjectsApi;
pub use tasks::TasksApi;
