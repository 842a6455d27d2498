use crate::core::directory::DirectorySnapshot;
use crate::core::{ConstraintStore, EntityDirectory, Result};
use crate::domain::model::{
    Constraint, ConstraintDraft, ConstraintKind, ConstraintLevel, ConstraintType, RuleDomain,
    TargetOption, GLOBAL_TARGET,
};
use crate::utils::error::SchedulerError;
use std::sync::Arc;

/// Rule domain for a constraint type name, using the name-based
/// classification applied to types without an explicit kind.
pub fn rule_domain(type_name: &str) -> RuleDomain {
    ConstraintKind::classify(type_name).rule_domain()
}

/// Catalogs that could not be fetched during the last load: the rule and
/// type lists as well as any target pool that came back empty because of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub failed: Vec<&'static str>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the scheduling rules and the target pools they are validated against.
pub struct ConstraintRegistry<S> {
    store: Arc<S>,
    constraints: Vec<Constraint>,
    types: Vec<ConstraintType>,
    directory: DirectorySnapshot,
}

impl<S> ConstraintRegistry<S>
where
    S: ConstraintStore + EntityDirectory,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            constraints: Vec::new(),
            types: Vec::new(),
            directory: DirectorySnapshot::default(),
        }
    }

    /// Reloads rules, types and target pools. A failed rule or type fetch
    /// keeps the previously loaded list; a failed pool fetch empties that pool.
    pub async fn load(&mut self) -> LoadReport {
        let store = &*self.store;
        let (constraints, types, directory) = tokio::join!(
            store.get_constraints(),
            store.get_constraint_types(),
            DirectorySnapshot::load(store),
        );

        let mut report = LoadReport::default();
        match constraints {
            Ok(constraints) => self.constraints = constraints,
            Err(e) => {
                tracing::warn!(
                    "Failed to load constraints, keeping {} cached: {}",
                    self.constraints.len(),
                    e
                );
                report.failed.push("constraints");
            }
        }
        match types {
            Ok(types) => self.types = types,
            Err(e) => {
                tracing::warn!("Failed to load constraint types, keeping cached list: {}", e);
                report.failed.push("constraint_types");
            }
        }
        report.failed.extend(directory.failed.iter().copied());
        self.directory = directory;

        tracing::debug!(
            "Registry loaded {} constraints, {} types",
            self.constraints.len(),
            self.types.len()
        );
        report
    }

    pub fn list_constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Constraints that take part in enforcement.
    pub fn active_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.active)
    }

    pub fn constraint_types(&self) -> &[ConstraintType] {
        &self.types
    }

    pub fn get(&self, id: i64) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.id == id)
    }

    pub fn constraint_type(&self, type_id: i64) -> Option<&ConstraintType> {
        self.types.iter().find(|t| t.id == type_id)
    }

    pub fn target_pool(&self, level: ConstraintLevel) -> Vec<TargetOption> {
        self.directory.target_pool(level)
    }

    pub fn target_pool_for_label(&self, label: &str) -> Vec<TargetOption> {
        self.directory.target_pool_for_label(label)
    }

    pub fn rule_domain_for_type(&self, type_id: i64) -> Option<RuleDomain> {
        self.constraint_type(type_id).map(ConstraintType::rule_domain)
    }

    pub fn type_name(&self, constraint: &Constraint) -> &str {
        self.constraint_type(constraint.constraint_type_id)
            .map(|t| t.name.as_str())
            .unwrap_or("Unknown")
    }

    pub fn target_label(&self, constraint: &Constraint) -> String {
        self.target_pool(constraint.constraint_level.clone())
            .into_iter()
            .find(|t| t.id == constraint.constraint_target)
            .map(|t| t.name)
            .unwrap_or_else(|| "All".to_string())
    }

    pub fn validate(&self, draft: &ConstraintDraft) -> Result<()> {
        let constraint_type = self.constraint_type(draft.constraint_type_id).ok_or_else(|| {
            SchedulerError::validation(format!(
                "Unknown constraint type {}",
                draft.constraint_type_id
            ))
        })?;

        if !draft.constraint_level.is_known() {
            return Err(SchedulerError::validation(format!(
                "Unknown constraint level: {}",
                draft.constraint_level
            )));
        }
        if draft.constraint_level == ConstraintLevel::Global {
            if draft.constraint_target != GLOBAL_TARGET {
                return Err(SchedulerError::validation(format!(
                    "Global constraints must target \"{}\", got \"{}\"",
                    GLOBAL_TARGET, draft.constraint_target
                )));
            }
        } else if draft.constraint_target != GLOBAL_TARGET
            && !self
                .target_pool(draft.constraint_level.clone())
                .iter()
                .any(|t| t.id == draft.constraint_target)
        {
            return Err(SchedulerError::validation(format!(
                "Target \"{}\" is not a known {}",
                draft.constraint_target, draft.constraint_level
            )));
        }

        if !constraint_type.rule_domain().admits(&draft.constraint_rule) {
            return Err(SchedulerError::validation(format!(
                "Rule \"{}\" is not valid for constraint type \"{}\"",
                draft.constraint_rule, constraint_type.name
            )));
        }

        Ok(())
    }

    /// Creates the rule when the draft has no id, updates it otherwise.
    pub async fn upsert(&mut self, draft: &ConstraintDraft) -> Result<Constraint> {
        self.validate(draft)?;

        let payload = draft.payload();
        let stored = match draft.id {
            Some(id) => {
                if self.get(id).is_none() {
                    return Err(SchedulerError::not_found("Constraint", id));
                }
                self.store.update_constraint(id, &payload).await?
            }
            None => self.store.create_constraint(&payload).await?,
        };

        tracing::info!(
            "Saved constraint {} ({} / {})",
            stored.id,
            stored.constraint_level,
            stored.constraint_target
        );
        self.apply(stored.clone());
        self.load().await;
        Ok(stored)
    }

    pub async fn remove(&mut self, id: i64) -> Result<()> {
        if self.get(id).is_none() {
            return Err(SchedulerError::not_found("Constraint", id));
        }

        self.store.delete_constraint(id).await?;
        tracing::info!("Deleted constraint {}", id);
        self.constraints.retain(|c| c.id != id);
        self.load().await;
        Ok(())
    }

    /// Flips the enforcement flag, leaving every other field as stored.
    pub async fn set_active(&mut self, id: i64, active: bool) -> Result<Constraint> {
        let current = self
            .get(id)
            .ok_or_else(|| SchedulerError::not_found("Constraint", id))?;
        let payload = ConstraintDraft::from_constraint(current)
            .with_active(active)
            .payload();

        let stored = self.store.update_constraint(id, &payload).await?;
        tracing::info!("Constraint {} is now {}", id, if active { "active" } else { "inactive" });
        self.apply(stored.clone());
        self.load().await;
        Ok(stored)
    }

    fn apply(&mut self, stored: Constraint) {
        match self.constraints.iter_mut().find(|c| c.id == stored.id) {
            Some(existing) => *existing = stored,
            None => self.constraints.push(stored),
        }
    }
}

impl<S> ConstraintRegistry<S> {
    /// Pools as loaded, usable without the store bounds.
    pub fn directory(&self) -> &DirectorySnapshot {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::model::{Lecturer, Room};

    fn seeded_store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::new()
                .with_constraint_types(vec![
                    ConstraintType::new(1, "Room Type Restriction"),
                    ConstraintType::new(2, "Lecturer Unavailable Day"),
                    ConstraintType::new(3, "Max Hours"),
                ])
                .with_lecturers(vec![Lecturer {
                    id: 5,
                    first_name: "Alan".to_string(),
                    last_name: Some("Turing".to_string()),
                    title: None,
                }])
                .with_rooms(vec![Room {
                    id: 12,
                    name: "Lab 2".to_string(),
                    capacity: 30,
                    room_type: Some("Computer Lab".to_string()),
                }]),
        )
    }

    #[test]
    fn test_rule_domain_by_name() {
        assert_eq!(rule_domain("Room Type Restriction"), RuleDomain::RoomType);
        assert_eq!(
            rule_domain("Room Type Restriction").values(),
            Some(&["Lecture Classroom", "Computer Lab", "Game Design", "Seminar"][..])
        );
        assert_eq!(rule_domain("Lecturer Unavailable Day"), RuleDomain::Weekday);
        assert_eq!(rule_domain("Lecturer Unavailable Day").values().map(|v| v.len()), Some(5));
        assert_eq!(rule_domain("Max Hours"), RuleDomain::FreeText);
        assert_eq!(rule_domain("Max Hours").values(), None);
    }

    #[tokio::test]
    async fn test_upsert_round_trips_through_list() {
        let mut registry = ConstraintRegistry::new(seeded_store());
        assert!(registry.load().await.is_complete());

        let draft = ConstraintDraft::new(2)
            .with_level(ConstraintLevel::Lecturer)
            .with_target("5")
            .with_rule("Friday");
        let saved = registry.upsert(&draft).await.unwrap();

        let listed = registry.list_constraints();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], saved);
        assert_eq!(listed[0].constraint_target, "5");
        assert_eq!(listed[0].constraint_rule, "Friday");
        assert_eq!(registry.target_label(&listed[0]), "Alan Turing");
        assert_eq!(registry.type_name(&listed[0]), "Lecturer Unavailable Day");
    }

    #[tokio::test]
    async fn test_out_of_pool_target_is_rejected() {
        let mut registry = ConstraintRegistry::new(seeded_store());
        registry.load().await;

        let draft = ConstraintDraft::new(1)
            .with_level(ConstraintLevel::Room)
            .with_target("99");
        let err = registry.upsert(&draft).await.unwrap_err();
        assert!(matches!(err, SchedulerError::ValidationError { .. }));
        assert!(registry.list_constraints().is_empty());
    }

    #[tokio::test]
    async fn test_global_requires_sentinel() {
        let mut registry = ConstraintRegistry::new(seeded_store());
        registry.load().await;

        let draft = ConstraintDraft::new(3).with_target("5");
        assert!(matches!(
            registry.upsert(&draft).await,
            Err(SchedulerError::ValidationError { .. })
        ));

        let saved = registry.upsert(&ConstraintDraft::new(3).with_rule("20")).await.unwrap();
        assert_eq!(saved.constraint_level, ConstraintLevel::Global);
        assert_eq!(saved.constraint_target, GLOBAL_TARGET);
    }

    #[tokio::test]
    async fn test_rule_outside_domain_is_rejected() {
        let mut registry = ConstraintRegistry::new(seeded_store());
        registry.load().await;

        let draft = ConstraintDraft::new(1).with_rule("Sunday");
        assert!(matches!(
            registry.upsert(&draft).await,
            Err(SchedulerError::ValidationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_twice_reports_not_found() {
        let mut registry = ConstraintRegistry::new(seeded_store());
        registry.load().await;
        let saved = registry.upsert(&ConstraintDraft::new(3)).await.unwrap();

        registry.remove(saved.id).await.unwrap();
        let err = registry.remove(saved.id).await.unwrap_err();
        assert!(matches!(err, SchedulerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_active_keeps_other_fields() {
        let mut registry = ConstraintRegistry::new(seeded_store());
        registry.load().await;
        let draft = ConstraintDraft::new(1)
            .with_level(ConstraintLevel::Room)
            .with_target("12")
            .with_rule("Computer Lab");
        let saved = registry.upsert(&draft).await.unwrap();

        let toggled = registry.set_active(saved.id, false).await.unwrap();
        assert!(!toggled.active);
        assert_eq!(toggled.constraint_target, "12");
        assert_eq!(toggled.constraint_rule, "Computer Lab");
        assert_eq!(registry.active_constraints().count(), 0);
        assert_eq!(registry.list_constraints().len(), 1);
    }

    #[tokio::test]
    async fn test_unmanaged_level_is_listed_but_not_editable() {
        let program_rule = Constraint {
            id: 8,
            constraint_type_id: 3,
            constraint_level: ConstraintLevel::Other("Program".to_string()),
            constraint_target: "2".to_string(),
            constraint_rule: "18".to_string(),
            active: true,
        };
        let store = MemoryStore::new()
            .with_constraint_types(vec![ConstraintType::new(3, "Max Hours")])
            .with_constraints(vec![program_rule.clone()]);
        let mut registry = ConstraintRegistry::new(Arc::new(store));
        registry.load().await;

        assert_eq!(registry.list_constraints(), &[program_rule.clone()][..]);
        assert!(registry
            .target_pool(program_rule.constraint_level.clone())
            .is_empty());
        assert_eq!(registry.target_label(&program_rule), "All");

        let edit = ConstraintDraft::from_constraint(&program_rule).with_rule("20");
        assert!(matches!(
            registry.upsert(&edit).await,
            Err(SchedulerError::ValidationError { .. })
        ));

        let toggled = registry.set_active(8, false).await.unwrap();
        assert_eq!(toggled.constraint_level, program_rule.constraint_level);
        assert_eq!(toggled.constraint_rule, "18");
    }

    #[tokio::test]
    async fn test_update_of_unknown_id_is_not_found() {
        let mut registry = ConstraintRegistry::new(seeded_store());
        registry.load().await;

        let mut draft = ConstraintDraft::new(3);
        draft.id = Some(404);
        assert!(matches!(
            registry.upsert(&draft).await,
            Err(SchedulerError::NotFound { .. })
        ));
    }
}
