//! Credential storage: the authenticated session and its persistence.
//!
//! The store is an explicit object handed to every component that needs
//! credentials. Persistence goes through [`CredentialStorage`], with a
//! file-backed implementation for real use and an in-memory one for tests.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use taskpilot::store::{CredentialStore, MemoryStorage};
//!
//! let storage = MemoryStorage::new();
//! let store = CredentialStore::open(Arc::new(storage.clone()));
//! store.set_tokens("access", "refresh").unwrap();
//!
//! // A second store on the same storage sees the persisted tokens
//! let reopened = CredentialStore::open(Arc::new(storage));
//! assert_eq!(reopened.access_token().as_deref(), Some("access"));
//! ```

pub mod credentials;
pub mod errors;
pub mod storage;

pub use credentials::{CREDENTIALS_KEY, CredentialStore, Credentials, STORAGE_VERSION};
pub use errors::{CredentialError, CredentialResult, StorageError, StorageResult};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage};
