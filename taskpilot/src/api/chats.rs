//! Chats facade. Streaming replies go through the channel factory instead.

use crate::{
    models::{Chat, ChatId, ChatMessage, NewChat, NewMessage},
    net::{ApiResult, Coordinator, PendingRequest},
};

const CHATS: &str = "/api/v1/chats";

pub struct ChatsApi<'a> {
    coordinator: &'a Coordinator,
}

impl<'a> ChatsApi<'a> {
    pub fn new(coordinator: &'a Coordinator) -> Self {
        Self { coordinator }
    }

    pub async fn list(&self) -> ApiResult<Vec<Chat>> {
        self.coordinator.execute(PendingRequest::get(CHATS)).await
    }

    pub async fn get(&self, id: ChatId) -> ApiResult<Chat> {
        self.coordinator
            .execute(PendingRequest::get(format!("{CHATS}/{id}")))
            .await
    }

    pub async fn create(&self, chat: &NewChat) -> ApiResult<Chat> {
        self.coordinator
            .execute(PendingRequest::post(CHATS).json(chat)?)
            .await
    }

    pub async fn delete(&self, id: ChatId) -> ApiResult<()> {
        self.coordinator
            .execute_discard(PendingRequest::delete(format!("{CHATS}/{id}")))
            .await
    }

    pub async fn messages(&self, id: ChatId) -> ApiResult<Vec<ChatMessage>> {
        self.coordinator
            .execute(PendingRequest::get(format!("{CHATS}/{id}/messages")))
            .await
    }

    /// Post a message and wait for the stored copy (no streaming).
    pub async fn send_message(&self, id: ChatId, message: &NewMessage) -> ApiResult<ChatMessage> {
        self.coordinator
            .execute(PendingRequest::post(format!("{CHATS}/{id}/messages")).json(message)?)
            .await
    }
}
