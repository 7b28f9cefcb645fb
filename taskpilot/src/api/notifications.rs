//! Notifications facade. Live delivery goes through the channel factory.

use crate::{
    models::{Notification, NotificationId, UnreadCount},
    net::{ApiResult, Coordinator, PendingRequest},
};

const NOTIFICATIONS: &str = "/api/v1/notifications";

pub struct NotificationsApi<'a> {
    coordinator: &'a Coordinator,
}

impl<'a> NotificationsApi<'a> {
    pub fn new(coordinator: &'a Coordinator) -> Self {
        Self { coordinator }
    }

    pub async fn list(&self, unread_only: bool) -> ApiResult<Vec<Notification>> {
        let mut request = PendingRequest::get(NOTIFICATIONS);
        if unread_only {
            request = request.query("unread_only", true);
        }
        self.coordinator.execute(request).await
    }

    pub async fn unread_count(&self) -> ApiResult<u64> {
        let count: UnreadCount = self
            .coordinator
            .execute(PendingRequest::get(format!("{NOTIFICATIONS}/unread-count")))
            .await?;
        Ok(count.count)
    }

    pub async fn mark_read(&self, id: NotificationId) -> ApiResult<Notification> {
        self.coordinator
            .execute(PendingRequest::put(format!("{NOTIFICATIONS}/{id}/read")))
            .await
    }

    pub async fn mark_all_read(&self) -> ApiResult<()> {
        self.coordinator
            .execute_discard(PendingRequest::put(format!("{NOTIFICATIONS}/read-all")))
            .await
    }

    pub async fn delete(&self, id: NotificationId) -> ApiResult<()> {
        self.coordinator
            .execute_discard(PendingRequest::delete(format!("{NOTIFICATIONS}/{id}")))
            .await
    }
}
