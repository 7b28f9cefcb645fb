//! Projects facade.

use crate::{
    models::{NewProject, Project, ProjectId, ProjectUpdate},
    net::{ApiResult, Coordinator, PendingRequest},
};

const PROJECTS: &str = "/api/v1/projects";

pub struct ProjectsApi<'a> {
    coordinator: &'a Coordinator,
}

impl<'a> ProjectsApi<'a> {
    pub fn new(coordinator: &'a Coordinator) -> Self {
        Self { coordinator }
    }

    pub async fn list(&self) -> ApiResult<Vec<Project>> {
        self.coordinator.execute(PendingRequest::get(PROJECTS)).await
    }

    pub async fn get(&self, id: ProjectId) -> ApiResult<Project> {
        self.coordinator
            .execute(PendingRequest::get(format!("{PROJECTS}/{id}")))
            .await
    }

    pub async fn create(&self, project: &NewProject) -> ApiResult<Project> {
        self.coordinator
            .execute(PendingRequest::post(PROJECTS).json(project)?)
            .await
    }

    pub async fn update(&self, id: ProjectId, update: &ProjectUpdate) -> ApiResult<Project> {
        self.coordinator
            .execute(PendingRequest::put(format!("{PROJECTS}/{id}")).json(update)?)
            .await
    }

    pub async fn delete(&self, id: ProjectId) -> ApiResult<()> {
        self.coordinator
            .execute_discard(PendingRequest::delete(format!("{PROJECTS}/{id}")))
            .await
    }
}
