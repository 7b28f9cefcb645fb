//! Entry point wiring store, dispatcher, coordinator and channel factory.

use std::sync::Arc;

use crate::{
    api::{AuthApi, ChatsApi, NotificationsApi, ProjectsApi, TasksApi},
    config::ClientConfig,
    net::{ChannelFactory, Coordinator, Dispatcher},
    store::{CredentialStore, FileStorage},
};

/// Client for the TaskPilot backend.
///
/// Cloning is cheap and clones share the same credential store.
#[derive(Debug, Clone)]
pub struct TaskPilotClient {
    coordinator: Arc<Coordinator>,
    channels: ChannelFactory,
}

impl TaskPilotClient {
    /// Client persisting credentials under `config.data_dir`.
    pub fn new(config: &ClientConfig) -> Self {
        let storage = Arc::new(FileStorage::new(&config.data_dir));
        let store = Arc::new(CredentialStore::open(storage));
        Self::with_store(&config.api_url, store)
    }

    /// Client sharing an existing credential store.
    pub fn with_store(api_url: &str, store: Arc<CredentialStore>) -> Self {
        let dispatcher = Dispatcher::new(reqwest::Client::new(), api_url, store.clone());
        Self {
            coordinator: Arc::new(Coordinator::new(dispatcher)),
            channels: ChannelFactory::new(api_url, store),
        }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        self.coordinator.store()
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn channels(&self) -> &ChannelFactory {
        &self.channels
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.coordinator)
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(&self.coordinator)
    }

    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi::new(&self.coordinator)
    }

    pub fn chats(&self) -> ChatsApi<'_> {
        ChatsApi::new(&self.coordinator)
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(&self.coordinator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_store() {
        let client = TaskPilotClient::with_store(
            "http://localhost:8000",
            Arc::new(CredentialStore::in_memory()),
        );
        let other = client.clone();

        client.store().set_tokens("A1", "R1").unwrap();
        assert_eq!(other.store().access_token().as_deref(), Some("A1"));
    }

    #[test]
    fn test_new_rehydrates_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new("http://localhost:8000", dir.path());

        TaskPilotClient::new(&config)
            .store()
            .set_tokens("A1", "R1")
            .unwrap();

        let restarted = TaskPilotClient::new(&config);
        assert_eq!(restarted.store().access_token().as_deref(), Some("A1"));
        assert_eq!(restarted.store().refresh_token().as_deref(), Some("R1"));
    }
}
