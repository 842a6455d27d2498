use crate::domain::model::{
    Constraint, ConstraintPayload, ConstraintType, GridSettings, Group, Lecturer, Module,
    ModuleDraft, NewScheduleEntry, OccupancyKey, OfferedModule, Program, Room, Semester,
    Specialization, TimetableEntry,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read-only reference catalogs owned by the external store.
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    async fn get_lecturers(&self) -> Result<Vec<Lecturer>>;
    async fn get_groups(&self) -> Result<Vec<Group>>;
    async fn get_modules(&self) -> Result<Vec<Module>>;
    async fn get_rooms(&self) -> Result<Vec<Room>>;
    async fn get_programs(&self) -> Result<Vec<Program>>;
    async fn get_specializations(&self) -> Result<Vec<Specialization>>;
    async fn get_offered_modules(&self, semester: &str) -> Result<Vec<OfferedModule>>;
    async fn get_semesters(&self) -> Result<Vec<Semester>>;
}

#[async_trait]
pub trait ConstraintStore: Send + Sync {
    async fn get_constraints(&self) -> Result<Vec<Constraint>>;
    async fn get_constraint_types(&self) -> Result<Vec<ConstraintType>>;
    async fn create_constraint(&self, payload: &ConstraintPayload) -> Result<Constraint>;
    async fn update_constraint(&self, id: i64, payload: &ConstraintPayload) -> Result<Constraint>;
    async fn delete_constraint(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get_schedule(&self, semester: &str) -> Result<Vec<TimetableEntry>>;
    async fn create_schedule_entry(&self, entry: &NewScheduleEntry) -> Result<TimetableEntry>;
    async fn delete_schedule_entry(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait ModuleStore: Send + Sync {
    async fn create_module(&self, draft: &ModuleDraft) -> Result<Module>;
    async fn update_module(&self, module_code: &str, draft: &ModuleDraft) -> Result<Module>;
    async fn delete_module(&self, module_code: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn session_minutes(&self) -> u32;
    fn first_hour(&self) -> u32;
    fn last_hour(&self) -> u32;
    fn occupancy_key(&self) -> OccupancyKey;

    fn grid_settings(&self) -> GridSettings {
        GridSettings {
            session_minutes: self.session_minutes(),
            first_hour: self.first_hour(),
            last_hour: self.last_hour(),
            occupancy: self.occupancy_key(),
        }
    }
}
