//! The credential store: the single holder of the signed-in session.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::{
    errors::{CredentialError, CredentialResult, StorageError},
    storage::{CredentialStorage, MemoryStorage},
};
use crate::models::UserProfile;

/// Storage key the credentials are persisted under.
pub const CREDENTIALS_KEY: &str = "taskpilot-auth";

/// Version of the persisted envelope. Anything else is discarded on load.
pub const STORAGE_VERSION: u32 = 1;

/// Access token, refresh token and profile of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Credentials {
    /// True iff both tokens and the user are present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some() && self.user.is_some()
    }
}

#[derive(Serialize)]
struct PersistedRef<'a> {
    version: u32,
    state: &'a Credentials,
}

#[derive(Deserialize)]
struct Persisted {
    version: u32,
    state: Credentials,
}

/// Process-wide credential holder, shared by reference.
///
/// Reads are pull-based snapshots. Each mutator takes the write lock,
/// updates memory, and writes the new state through to storage before
/// releasing the lock, so no reader observes a half-applied update and the
/// persisted order matches the in-memory order. A storage failure is
/// reported to the caller after memory has already been updated.
pub struct CredentialStore {
    state: RwLock<Credentials>,
    storage: Arc<dyn CredentialStorage>,
}

impl CredentialStore {
    /// Rehydrate from `storage`. Missing or unusable data yields the empty
    /// state.
    pub fn open(storage: Arc<dyn CredentialStorage>) -> Self {
        let state = load_state(storage.as_ref());
        Self {
            state: RwLock::new(state),
            storage,
        }
    }

    /// A store backed by fresh in-memory storage.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()))
    }

    pub fn snapshot(&self) -> Credentials {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Replace both tokens, keeping the user.
    ///
    /// # Errors
    ///
    /// * `EmptyAccessToken` - nothing was changed
    /// * `Storage` - memory was updated but persisting failed
    pub fn set_tokens(
        &self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> CredentialResult<()> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(CredentialError::EmptyAccessToken);
        }
        let refresh_token = refresh_token.into();

        self.update(|state| {
            state.access_token = Some(access_token);
            state.refresh_token = Some(refresh_token);
        })
    }

    /// Replace the cached profile, keeping the tokens.
    pub fn set_user(&self, user: UserProfile) -> CredentialResult<()> {
        self.update(|state| state.user = Some(user))
    }

    /// Install a complete session in a single update.
    pub fn establish(
        &self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: UserProfile,
    ) -> CredentialResult<()> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(CredentialError::EmptyAccessToken);
        }
        let refresh_token = refresh_token.into();

        self.update(|state| {
            *state = Credentials {
                access_token: Some(access_token),
                refresh_token: Some(refresh_token),
                user: Some(user),
            };
        })
    }

    /// Install a refreshed access token, but only while `refresh_token` is
    /// still the stored one.
    ///
    /// Returns `Ok(false)` and changes nothing when the session was ended or
    /// replaced while the refresh was in flight.
    ///
    /// # Errors
    ///
    /// * `EmptyAccessToken` - nothing was changed
    /// * `Storage` - memory was updated but persisting failed
    pub fn refresh_access_token(
        &self,
        access_token: impl Into<String>,
        refresh_token: &str,
    ) -> CredentialResult<bool> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(CredentialError::EmptyAccessToken);
        }

        let mut state = self.write();
        if state.refresh_token.as_deref() != Some(refresh_token) {
            return Ok(false);
        }
        state.access_token = Some(access_token);
        self.persist(&state)?;
        Ok(true)
    }

    /// Clear tokens and user together and drop the persisted entry.
    pub fn logout(&self) -> CredentialResult<()> {
        let mut state = self.write();
        *state = Credentials::default();
        self.storage.remove(CREDENTIALS_KEY)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Credentials)) -> CredentialResult<()> {
        let mut state = self.write();
        apply(&mut *state);
        self.persist(&state)?;
        Ok(())
    }

    fn persist(&self, state: &Credentials) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&PersistedRef {
            version: STORAGE_VERSION,
            state,
        })?;
        self.storage.save(CREDENTIALS_KEY, &encoded)
    }

    // A panic while holding the lock cannot leave `Credentials` half-written
    // (every mutation is a plain field assignment), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Credentials> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("CredentialStore")
            .field("has_access_token", &state.access_token.is_some())
            .field("has_refresh_token", &state.refresh_token.is_some())
            .field("user_id", &state.user.as_ref().map(|u| u.id))
            .finish()
    }
}

fn load_state(storage: &dyn CredentialStorage) -> Credentials {
    let raw = match storage.load(CREDENTIALS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Credentials::default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stored credentials, starting signed out");
            return Credentials::default();
        }
    };

    match serde_json::from_str::<Persisted>(&raw) {
        Ok(persisted) if persisted.version == STORAGE_VERSION => persisted.state,
        Ok(persisted) => {
            tracing::warn!(
                version = persisted.version,
                expected = STORAGE_VERSION,
                "Discarding stored credentials with unknown version"
            );
            Credentials::default()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Discarding corrupt stored credentials");
            Credentials::default()
        }
    }
}
