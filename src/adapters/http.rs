use crate::core::{
    ConfigProvider, ConstraintStore, EntityDirectory, ModuleStore, Result, ScheduleStore,
};
use crate::domain::model::{
    Constraint, ConstraintPayload, ConstraintType, Group, Lecturer, Module, ModuleDraft,
    NewScheduleEntry, OfferedModule, Program, Room, Semester, Specialization, TimetableEntry,
};
use crate::utils::error::SchedulerError;
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// REST client for the scheduling backend.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut normalized = base_url.trim().to_string();
        // Url::join replaces the last path segment unless the base ends in '/'.
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized).map_err(|e| SchedulerError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(
            config.api_base_url(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| SchedulerError::ConfigError {
            message: format!("Cannot build URL for {}: {}", path, e),
        })
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = self.url(path)?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        let response = check(response, None)?;
        Ok(response.json().await?)
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        target: Option<(&'static str, &str)>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);
        let response = self.client.request(method, url).json(body).send().await?;
        let response = check(response, target)?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str, entity: &'static str, id: &str) -> Result<()> {
        let url = self.url(path)?;
        tracing::debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        check(response, Some((entity, id)))?;
        Ok(())
    }
}

/// 404 on a by-id call means the record is gone; any other failure status
/// is reported as a remote failure.
fn check(response: Response, target: Option<(&'static str, &str)>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    tracing::debug!("Remote store answered {} for {}", status, response.url());
    match target {
        Some((entity, id)) if status == StatusCode::NOT_FOUND => {
            Err(SchedulerError::not_found(entity, id))
        }
        _ => Err(SchedulerError::RemoteStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        }),
    }
}

#[async_trait]
impl EntityDirectory for HttpStore {
    async fn get_lecturers(&self) -> Result<Vec<Lecturer>> {
        self.get_list("lecturers/", &[]).await
    }

    async fn get_groups(&self) -> Result<Vec<Group>> {
        self.get_list("groups/", &[]).await
    }

    async fn get_modules(&self) -> Result<Vec<Module>> {
        self.get_list("modules/", &[]).await
    }

    async fn get_rooms(&self) -> Result<Vec<Room>> {
        self.get_list("rooms/", &[]).await
    }

    async fn get_programs(&self) -> Result<Vec<Program>> {
        self.get_list("study-programs/", &[]).await
    }

    async fn get_specializations(&self) -> Result<Vec<Specialization>> {
        self.get_list("specializations/", &[]).await
    }

    async fn get_offered_modules(&self, semester: &str) -> Result<Vec<OfferedModule>> {
        self.get_list("offered-modules/", &[("semester", semester)])
            .await
    }

    async fn get_semesters(&self) -> Result<Vec<Semester>> {
        self.get_list("semesters/", &[]).await
    }
}

#[async_trait]
impl ConstraintStore for HttpStore {
    async fn get_constraints(&self) -> Result<Vec<Constraint>> {
        self.get_list("scheduler-constraints/", &[]).await
    }

    async fn get_constraint_types(&self) -> Result<Vec<ConstraintType>> {
        self.get_list("constraint-types/", &[]).await
    }

    async fn create_constraint(&self, payload: &ConstraintPayload) -> Result<Constraint> {
        self.send_json(Method::POST, "scheduler-constraints/", payload, None)
            .await
    }

    async fn update_constraint(&self, id: i64, payload: &ConstraintPayload) -> Result<Constraint> {
        let id = id.to_string();
        self.send_json(
            Method::PUT,
            &format!("scheduler-constraints/{}", id),
            payload,
            Some(("Constraint", &id)),
        )
        .await
    }

    async fn delete_constraint(&self, id: i64) -> Result<()> {
        let id = id.to_string();
        self.delete(&format!("scheduler-constraints/{}", id), "Constraint", &id)
            .await
    }
}

#[async_trait]
impl ScheduleStore for HttpStore {
    async fn get_schedule(&self, semester: &str) -> Result<Vec<TimetableEntry>> {
        self.get_list("schedule/", &[("semester", semester)]).await
    }

    async fn create_schedule_entry(&self, entry: &NewScheduleEntry) -> Result<TimetableEntry> {
        self.send_json(Method::POST, "schedule/", entry, None).await
    }

    async fn delete_schedule_entry(&self, id: i64) -> Result<()> {
        let id = id.to_string();
        self.delete(&format!("schedule/{}", id), "Timetable entry", &id)
            .await
    }
}

#[async_trait]
impl ModuleStore for HttpStore {
    async fn create_module(&self, draft: &ModuleDraft) -> Result<Module> {
        self.send_json(Method::POST, "modules/", draft, None).await
    }

    async fn update_module(&self, module_code: &str, draft: &ModuleDraft) -> Result<Module> {
        self.send_json(
            Method::PUT,
            &format!("modules/{}", module_code),
            draft,
            Some(("Module", module_code)),
        )
        .await
    }

    async fn delete_module(&self, module_code: &str) -> Result<()> {
        self.delete(&format!("modules/{}", module_code), "Module", module_code)
            .await
    }
}
