use crate::core::{EntityDirectory, Result};
use crate::domain::model::{ConstraintLevel, Group, Lecturer, Module, Room, TargetOption};

const UNNAMED: &str = "Unnamed";

/// Keeps the value of a settled catalog fetch, or an empty list when the
/// fetch failed. Only directory reads are allowed to degrade this way.
pub(crate) fn settle<T>(catalog: &str, fetched: Result<Vec<T>>) -> Vec<T> {
    match fetched {
        Ok(items) => {
            tracing::debug!("Loaded {} {}", items.len(), catalog);
            items
        }
        Err(e) => {
            tracing::warn!("Failed to load {}, continuing with an empty list: {}", catalog, e);
            Vec::new()
        }
    }
}

fn settle_tracked<T>(
    catalog: &'static str,
    fetched: Result<Vec<T>>,
    failed: &mut Vec<&'static str>,
) -> Vec<T> {
    if fetched.is_err() {
        failed.push(catalog);
    }
    settle(catalog, fetched)
}

/// The catalogs constraint targets are drawn from.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    pub lecturers: Vec<Lecturer>,
    pub groups: Vec<Group>,
    pub modules: Vec<Module>,
    pub rooms: Vec<Room>,
    /// Catalogs whose fetch failed and whose pool is therefore empty.
    pub failed: Vec<&'static str>,
}

impl DirectorySnapshot {
    /// Fetches all four catalogs concurrently. Each fetch settles on its own.
    pub async fn load<D: EntityDirectory + ?Sized>(directory: &D) -> Self {
        let (lecturers, groups, modules, rooms) = tokio::join!(
            directory.get_lecturers(),
            directory.get_groups(),
            directory.get_modules(),
            directory.get_rooms(),
        );

        let mut failed = Vec::new();
        Self {
            lecturers: settle_tracked("lecturers", lecturers, &mut failed),
            groups: settle_tracked("groups", groups, &mut failed),
            modules: settle_tracked("modules", modules, &mut failed),
            rooms: settle_tracked("rooms", rooms, &mut failed),
            failed,
        }
    }

    pub fn target_pool(&self, level: ConstraintLevel) -> Vec<TargetOption> {
        match level {
            ConstraintLevel::Global => vec![TargetOption::global()],
            ConstraintLevel::Lecturer => self
                .lecturers
                .iter()
                .map(|l| TargetOption::new(l.id, l.display_name()))
                .collect(),
            ConstraintLevel::Group => self
                .groups
                .iter()
                .map(|g| TargetOption::new(g.id, non_empty_or_unnamed(g.name.as_deref())))
                .collect(),
            ConstraintLevel::Module => self
                .modules
                .iter()
                .map(|m| TargetOption::new(&m.module_code, non_empty_or_unnamed(Some(&m.name))))
                .collect(),
            ConstraintLevel::Room => self
                .rooms
                .iter()
                .map(|r| TargetOption::new(r.id, non_empty_or_unnamed(Some(&r.name))))
                .collect(),
            ConstraintLevel::Other(_) => Vec::new(),
        }
    }

    /// Pool for a free-form level label. Unknown labels get an empty pool.
    pub fn target_pool_for_label(&self, label: &str) -> Vec<TargetOption> {
        label
            .parse::<ConstraintLevel>()
            .map(|level| self.target_pool(level))
            .unwrap_or_default()
    }
}

fn non_empty_or_unnamed(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNNAMED.to_string(),
    }
}
