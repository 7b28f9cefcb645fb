//! Wire types exchanged with the TaskPilot backend.
//!
//! Every response body the facades return is decoded into one of these
//! types, so a shape mismatch surfaces as a decode error instead of a
//! loosely typed value.

pub mod chat;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;

pub use chat::{Chat, ChatId, ChatMessage, ChatStreamEvent, MessageId, MessageRole, NewChat, NewMessage};
pub use notification::{Notification, NotificationId, UnreadCount};
pub use project::{NewProject, Project, ProjectId, ProjectUpdate};
pub use task::{NewTask, Task, TaskFilter, TaskId, TaskPriority, TaskStatus, TaskUpdate};
pub use user::{
    AuthResponse, LoginRequest, LogoutRequest, ProfileUpdate, RefreshRequest, RefreshResponse,
    RegisterRequest, UserId, UserProfile,
};
