pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{HttpStore, MemoryStore};
pub use core::{
    access::{AccessContext, Role},
    catalog::ModuleCatalog,
    grid::TimetableGrid,
    registry::{rule_domain, ConstraintRegistry},
};
pub use utils::error::{Result, SchedulerError};
