//! HTTP and WebSocket plumbing between the facades and the backend.
//!
//! A request flows facade → [`Coordinator`] → [`Dispatcher`] → network.
//! The dispatcher performs exactly one call; the coordinator adds the
//! one-shot refresh-then-retry policy on top of it. Streaming connections
//! are opened by the [`ChannelFactory`].

/// Live streaming connections authenticated at connect time.
pub mod channel;

/// One-shot refresh-then-retry policy over the dispatcher.
pub mod coordinator;

/// Single HTTP call with bearer token attachment and failure classification.
pub mod dispatcher;

/// Error taxonomy shared by the whole request pipeline.
pub mod errors;

/// Description of a call that can be replayed once.
pub mod request;

pub use channel::{ChannelFactory, ChannelPurpose, StreamChannel};
pub use coordinator::{Coordinator, REFRESH_PATH};
pub use dispatcher::Dispatcher;
pub use errors::{ApiError, ApiResult, ErrorKind};
pub use request::{Attempt, PendingRequest};
