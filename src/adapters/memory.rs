use crate::core::{ConstraintStore, EntityDirectory, ModuleStore, Result, ScheduleStore};
use crate::domain::model::{
    Constraint, ConstraintPayload, ConstraintType, Group, Lecturer, Module, ModuleDraft,
    NewScheduleEntry, OfferedModule, Program, Room, Semester, Specialization, TimetableEntry,
};
use crate::utils::error::SchedulerError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    constraints: Vec<Constraint>,
    constraint_types: Vec<ConstraintType>,
    lecturers: Vec<Lecturer>,
    groups: Vec<Group>,
    modules: Vec<Module>,
    rooms: Vec<Room>,
    programs: Vec<Program>,
    specializations: Vec<Specialization>,
    offered_modules: HashMap<String, Vec<OfferedModule>>,
    semesters: Vec<Semester>,
    schedule: Vec<TimetableEntry>,
    last_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Store kept entirely in process memory. Ids are assigned on create the
/// way the remote store does; no scheduling invariants are enforced here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        let state = self.state.get_mut();
        state.last_id = constraints.iter().map(|c| c.id).fold(state.last_id, i64::max);
        state.constraints = constraints;
        self
    }

    pub fn with_constraint_types(mut self, types: Vec<ConstraintType>) -> Self {
        self.state.get_mut().constraint_types = types;
        self
    }

    pub fn with_lecturers(mut self, lecturers: Vec<Lecturer>) -> Self {
        self.state.get_mut().lecturers = lecturers;
        self
    }

    pub fn with_groups(mut self, groups: Vec<Group>) -> Self {
        self.state.get_mut().groups = groups;
        self
    }

    pub fn with_modules(mut self, modules: Vec<Module>) -> Self {
        self.state.get_mut().modules = modules;
        self
    }

    pub fn with_rooms(mut self, rooms: Vec<Room>) -> Self {
        self.state.get_mut().rooms = rooms;
        self
    }

    pub fn with_programs(mut self, programs: Vec<Program>) -> Self {
        self.state.get_mut().programs = programs;
        self
    }

    pub fn with_specializations(mut self, specializations: Vec<Specialization>) -> Self {
        self.state.get_mut().specializations = specializations;
        self
    }

    pub fn with_offered_modules(mut self, semester: &str, offered: Vec<OfferedModule>) -> Self {
        self.state
            .get_mut()
            .offered_modules
            .insert(semester.to_string(), offered);
        self
    }

    pub fn with_semesters(mut self, semesters: Vec<Semester>) -> Self {
        self.state.get_mut().semesters = semesters;
        self
    }

    pub fn with_schedule(mut self, schedule: Vec<TimetableEntry>) -> Self {
        let state = self.state.get_mut();
        state.last_id = schedule.iter().map(|e| e.id).fold(state.last_id, i64::max);
        state.schedule = schedule;
        self
    }
}

fn constraint_from(id: i64, payload: &ConstraintPayload) -> Constraint {
    Constraint {
        id,
        constraint_type_id: payload.constraint_type_id,
        constraint_level: payload.constraint_level.clone(),
        constraint_target: payload.constraint_target.clone(),
        constraint_rule: payload.constraint_rule.clone(),
        active: payload.active,
    }
}

fn module_from(draft: &ModuleDraft) -> Module {
    Module {
        module_code: draft.module_code.clone(),
        name: draft.name.clone(),
        ects: draft.ects,
        semester: draft.semester,
        room_type: draft.room_type.clone(),
        assessment_type: Some(draft.assessment_type.clone()),
        category: Some(draft.category.clone()),
        program_id: draft.program_id,
    }
}

#[async_trait]
impl EntityDirectory for MemoryStore {
    async fn get_lecturers(&self) -> Result<Vec<Lecturer>> {
        Ok(self.state.lock().await.lecturers.clone())
    }

    async fn get_groups(&self) -> Result<Vec<Group>> {
        Ok(self.state.lock().await.groups.clone())
    }

    async fn get_modules(&self) -> Result<Vec<Module>> {
        Ok(self.state.lock().await.modules.clone())
    }

    async fn get_rooms(&self) -> Result<Vec<Room>> {
        Ok(self.state.lock().await.rooms.clone())
    }

    async fn get_programs(&self) -> Result<Vec<Program>> {
        Ok(self.state.lock().await.programs.clone())
    }

    async fn get_specializations(&self) -> Result<Vec<Specialization>> {
        Ok(self.state.lock().await.specializations.clone())
    }

    async fn get_offered_modules(&self, semester: &str) -> Result<Vec<OfferedModule>> {
        let state = self.state.lock().await;
        Ok(state
            .offered_modules
            .get(semester)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_semesters(&self) -> Result<Vec<Semester>> {
        Ok(self.state.lock().await.semesters.clone())
    }
}

#[async_trait]
impl ConstraintStore for MemoryStore {
    async fn get_constraints(&self) -> Result<Vec<Constraint>> {
        Ok(self.state.lock().await.constraints.clone())
    }

    async fn get_constraint_types(&self) -> Result<Vec<ConstraintType>> {
        Ok(self.state.lock().await.constraint_types.clone())
    }

    async fn create_constraint(&self, payload: &ConstraintPayload) -> Result<Constraint> {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let constraint = constraint_from(id, payload);
        state.constraints.push(constraint.clone());
        Ok(constraint)
    }

    async fn update_constraint(&self, id: i64, payload: &ConstraintPayload) -> Result<Constraint> {
        let mut state = self.state.lock().await;
        let slot = state
            .constraints
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| SchedulerError::not_found("Constraint", id))?;
        *slot = constraint_from(id, payload);
        Ok(slot.clone())
    }

    async fn delete_constraint(&self, id: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        let before = state.constraints.len();
        state.constraints.retain(|c| c.id != id);
        if state.constraints.len() == before {
            return Err(SchedulerError::not_found("Constraint", id));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn get_schedule(&self, semester: &str) -> Result<Vec<TimetableEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .schedule
            .iter()
            .filter(|e| e.semester == semester)
            .cloned()
            .collect())
    }

    async fn create_schedule_entry(&self, entry: &NewScheduleEntry) -> Result<TimetableEntry> {
        let mut state = self.state.lock().await;
        let offered = state
            .offered_modules
            .get(&entry.semester)
            .and_then(|list| list.iter().find(|o| o.id == entry.offered_module_id))
            .cloned();
        let room_name = state
            .rooms
            .iter()
            .find(|r| r.id == entry.room_id)
            .map(|r| r.name.clone());

        let stored = TimetableEntry {
            id: state.next_id(),
            offered_module_id: entry.offered_module_id,
            room_id: entry.room_id,
            day_of_week: entry.day_of_week,
            start_time: entry.start_time.clone(),
            end_time: entry.end_time.clone(),
            semester: entry.semester.clone(),
            module_name: offered.as_ref().map(|o| o.module_name.clone()),
            lecturer_name: offered.map(|o| o.lecturer_name),
            room_name,
        };
        state.schedule.push(stored.clone());
        Ok(stored)
    }

    async fn delete_schedule_entry(&self, id: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        let before = state.schedule.len();
        state.schedule.retain(|e| e.id != id);
        if state.schedule.len() == before {
            return Err(SchedulerError::not_found("Timetable entry", id));
        }
        Ok(())
    }
}

#[async_trait]
impl ModuleStore for MemoryStore {
    async fn create_module(&self, draft: &ModuleDraft) -> Result<Module> {
        let mut state = self.state.lock().await;
        if state.modules.iter().any(|m| m.module_code == draft.module_code) {
            return Err(SchedulerError::validation(format!(
                "Module {} already exists",
                draft.module_code
            )));
        }
        let module = module_from(draft);
        state.modules.push(module.clone());
        Ok(module)
    }

    async fn update_module(&self, module_code: &str, draft: &ModuleDraft) -> Result<Module> {
        let mut state = self.state.lock().await;
        let slot = state
            .modules
            .iter_mut()
            .find(|m| m.module_code == module_code)
            .ok_or_else(|| SchedulerError::not_found("Module", module_code))?;
        *slot = module_from(draft);
        Ok(slot.clone())
    }

    async fn delete_module(&self, module_code: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let before = state.modules.len();
        state.modules.retain(|m| m.module_code != module_code);
        if state.modules.len() == before {
            return Err(SchedulerError::not_found("Module", module_code));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ConstraintLevel, Weekday};

    #[tokio::test]
    async fn test_ids_continue_after_seeded_records() {
        let store = MemoryStore::new().with_constraints(vec![Constraint {
            id: 41,
            constraint_type_id: 1,
            constraint_level: ConstraintLevel::Global,
            constraint_target: "0".to_string(),
            constraint_rule: String::new(),
            active: true,
        }]);

        let payload = ConstraintPayload {
            constraint_type_id: 1,
            constraint_level: ConstraintLevel::Global,
            constraint_target: "0".to_string(),
            constraint_rule: String::new(),
            active: false,
        };
        let created = store.create_constraint(&payload).await.unwrap();
        assert_eq!(created.id, 42);
        assert_eq!(store.get_constraints().await.unwrap().len(), 2);
    }

    #[test]
    fn test_schedule_entries_are_denormalized() {
        let store = MemoryStore::new()
            .with_offered_modules(
                "2024S1",
                vec![OfferedModule {
                    id: 3,
                    module_name: "Algorithms".to_string(),
                    lecturer_name: "D. Knuth".to_string(),
                }],
            )
            .with_rooms(vec![Room {
                id: 8,
                name: "C-3".to_string(),
                capacity: 60,
                room_type: None,
            }]);

        let entry = NewScheduleEntry {
            offered_module_id: 3,
            room_id: 8,
            day_of_week: Weekday::Monday,
            start_time: "08:00".to_string(),
            end_time: "09:00".to_string(),
            semester: "2024S1".to_string(),
        };
        let stored = tokio_test::block_on(store.create_schedule_entry(&entry)).unwrap();
        assert_eq!(stored.module_name.as_deref(), Some("Algorithms"));
        assert_eq!(stored.lecturer_name.as_deref(), Some("D. Knuth"));
        assert_eq!(stored.room_name.as_deref(), Some("C-3"));

        let other = tokio_test::block_on(store.get_schedule("2025S1")).unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.delete_schedule_entry(1).await,
            Err(SchedulerError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete_module("CS101").await,
            Err(SchedulerError::NotFound { .. })
        ));
    }
}
