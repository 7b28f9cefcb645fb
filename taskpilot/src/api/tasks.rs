//! Tasks facade.

use crate::{
    models::{NewTask, Task, TaskFilter, TaskId, TaskUpdate},
    net::{ApiResult, Coordinator, PendingRequest},
};

const TASKS: &str = "/api/v1/tasks";

pub struct TasksApi<'a> {
    coordinator: &'a Coordinator,
}

impl<'a> TasksApi<'a> {
    pub fn new(coordinator: &'a Coordinator) -> Self {
        Self { coordinator }
    }

    pub async fn list(&self, filter: &TaskFilter) -> ApiResult<Vec<Task>> {
        self.coordinator
            .execute(PendingRequest::get(TASKS).query_pairs(filter.to_query()))
            .await
    }

    pub async fn get(&self, id: TaskId) -> ApiResult<Task> {
        self.coordinator
            .execute(PendingRequest::get(format!("{TASKS}/{id}")))
            .await
    }

    pub async fn create(&self, task: &NewTask) -> ApiResult<Task> {
        self.coordinator
            .execute(PendingRequest::post(TASKS).json(task)?)
            .await
    }

    pub async fn update(&self, id: TaskId, update: &TaskUpdate) -> ApiResult<Task> {
        self.coordinator
            .execute(PendingRequest::put(format!("{TASKS}/{id}")).json(update)?)
            .await
    }

    pub async fn delete(&self, id: TaskId) -> ApiResult<()> {
        self.coordinator
            .execute_discard(PendingRequest::delete(format!("{TASKS}/{id}")))
            .await
    }
}
