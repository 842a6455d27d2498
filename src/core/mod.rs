pub mod access;
pub mod catalog;
pub mod directory;
pub mod grid;
pub mod registry;

pub use crate::domain::ports::{
    ConfigProvider, ConstraintStore, EntityDirectory, ModuleStore, ScheduleStore,
};
pub use crate::utils::error::Result;
