use crate::app::presentation::{render_constraints, render_grid, render_targets};
use crate::config::cli::{Command, ConstraintsCommand, TimetableCommand};
use crate::core::grid::TimetableGrid;
use crate::core::registry::{rule_domain, ConstraintRegistry};
use crate::core::{ConstraintStore, EntityDirectory, Result, ScheduleStore};
use crate::domain::model::{ConstraintDraft, ConstraintLevel, GridSettings, Weekday};
use crate::utils::error::SchedulerError;
use std::sync::Arc;

/// Runs one CLI command against the store and returns the text to print.
pub async fn execute<S>(command: &Command, store: Arc<S>, settings: GridSettings) -> Result<String>
where
    S: ConstraintStore + ScheduleStore + EntityDirectory,
{
    match command {
        Command::Constraints(cmd) => constraints(cmd, store).await,
        Command::Timetable(cmd) => timetable(cmd, store, settings).await,
    }
}

async fn loaded_registry<S>(store: Arc<S>) -> ConstraintRegistry<S>
where
    S: ConstraintStore + EntityDirectory,
{
    let mut registry = ConstraintRegistry::new(store);
    let report = registry.load().await;
    if !report.is_complete() {
        tracing::warn!("Partial load, unavailable: {}", report.failed.join(", "));
    }
    registry
}

async fn constraints<S>(command: &ConstraintsCommand, store: Arc<S>) -> Result<String>
where
    S: ConstraintStore + EntityDirectory,
{
    match command {
        ConstraintsCommand::Domain { type_name } => Ok(match rule_domain(type_name).values() {
            Some(values) => format!("{}\n", values.join("\n")),
            None => "(free text)\n".to_string(),
        }),
        ConstraintsCommand::List => {
            let registry = loaded_registry(store).await;
            Ok(render_constraints(&registry))
        }
        ConstraintsCommand::Targets { level } => {
            let registry = loaded_registry(store).await;
            Ok(render_targets(&registry.target_pool_for_label(level)))
        }
        ConstraintsCommand::Save {
            id,
            type_id,
            level,
            target,
            rule,
            inactive,
        } => {
            let level: ConstraintLevel = level.parse()?;
            let mut registry = loaded_registry(store).await;
            let base = match id {
                Some(id) => ConstraintDraft::from_constraint(
                    registry
                        .get(*id)
                        .ok_or_else(|| SchedulerError::not_found("Constraint", id))?,
                ),
                None => ConstraintDraft::new(*type_id),
            };
            let constraint_type = registry
                .constraint_type(*type_id)
                .cloned()
                .ok_or_else(|| {
                    SchedulerError::validation(format!("Unknown constraint type {}", type_id))
                })?;
            let draft = base
                .with_type(&constraint_type)
                .with_level(level)
                .with_target(target.as_str())
                .with_rule(rule.as_str())
                .with_active(!inactive);

            let saved = registry.upsert(&draft).await?;
            Ok(format!("Saved constraint {}\n", saved.id))
        }
        ConstraintsCommand::Toggle { id, active } => {
            let mut registry = loaded_registry(store).await;
            let saved = registry.set_active(*id, *active).await?;
            Ok(format!(
                "Constraint {} is {}\n",
                saved.id,
                if saved.active { "active" } else { "inactive" }
            ))
        }
        ConstraintsCommand::Delete { id } => {
            let mut registry = loaded_registry(store).await;
            registry.remove(*id).await?;
            Ok(format!("Deleted constraint {}\n", id))
        }
    }
}

async fn timetable<S>(
    command: &TimetableCommand,
    store: Arc<S>,
    settings: GridSettings,
) -> Result<String>
where
    S: ScheduleStore + EntityDirectory,
{
    let mut grid = TimetableGrid::new(store, settings);

    match command {
        TimetableCommand::Show { semester } => {
            let semester = match semester {
                Some(semester) => semester.clone(),
                None => grid
                    .default_semester()
                    .await
                    .ok_or_else(|| SchedulerError::validation("No semester available"))?,
            };
            grid.load_semester(&semester).await?;
            Ok(render_grid(&grid, &semester))
        }
        TimetableCommand::Place {
            semester,
            day,
            time,
            module,
            room,
        } => {
            let day: Weekday = day.parse()?;
            grid.load_semester(semester).await?;
            let entry = grid.place(semester, day, time, *module, *room).await?;
            Ok(format!(
                "Placed entry {} on {} {}-{}\n",
                entry.id, entry.day_of_week, entry.start_time, entry.end_time
            ))
        }
        TimetableCommand::Remove { semester, id } => {
            grid.load_semester(semester).await?;
            grid.remove(*id).await?;
            Ok(format!("Removed entry {}\n", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::model::{ConstraintType, OfferedModule, Room, Semester};

    fn store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::new()
                .with_constraint_types(vec![ConstraintType::new(1, "Room Type Restriction")])
                .with_rooms(vec![Room {
                    id: 2,
                    name: "Lab".to_string(),
                    capacity: 20,
                    room_type: None,
                }])
                .with_semesters(vec![Semester {
                    id: 1,
                    name: "2024S1".to_string(),
                }])
                .with_offered_modules(
                    "2024S1",
                    vec![OfferedModule {
                        id: 5,
                        module_name: "Networks".to_string(),
                        lecturer_name: "V. Cerf".to_string(),
                    }],
                ),
        )
    }

    #[tokio::test]
    async fn test_save_then_list() {
        let store = store();
        let save = Command::Constraints(ConstraintsCommand::Save {
            id: None,
            type_id: 1,
            level: "room".to_string(),
            target: "2".to_string(),
            rule: "Computer Lab".to_string(),
            inactive: false,
        });
        let out = execute(&save, store.clone(), GridSettings::default()).await.unwrap();
        assert_eq!(out, "Saved constraint 1\n");

        let list = Command::Constraints(ConstraintsCommand::List);
        let out = execute(&list, store, GridSettings::default()).await.unwrap();
        assert!(out.contains("Room Type Restriction"));
        assert!(out.contains("Lab"));
        assert!(out.contains("Active"));
    }

    #[tokio::test]
    async fn test_domain_needs_no_store_data() {
        let cmd = Command::Constraints(ConstraintsCommand::Domain {
            type_name: "Max Hours".to_string(),
        });
        let out = execute(&cmd, store(), GridSettings::default()).await.unwrap();
        assert_eq!(out, "(free text)\n");
    }

    #[tokio::test]
    async fn test_place_and_show_default_semester() {
        let store = store();
        let place = Command::Timetable(TimetableCommand::Place {
            semester: "2024S1".to_string(),
            day: "monday".to_string(),
            time: "08:00".to_string(),
            module: Some(5),
            room: Some(2),
        });
        let out = execute(&place, store.clone(), GridSettings::default()).await.unwrap();
        assert!(out.contains("Monday 08:00-09:00"));

        let again = execute(&place, store.clone(), GridSettings::default()).await;
        assert!(matches!(again, Err(SchedulerError::SlotOccupied { .. })));

        let show = Command::Timetable(TimetableCommand::Show { semester: None });
        let out = execute(&show, store, GridSettings::default()).await.unwrap();
        assert!(out.contains("Networks"));
    }
}
