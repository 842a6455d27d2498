use crate::core::access::AccessContext;
use crate::core::directory::settle;
use crate::core::{EntityDirectory, ModuleStore, Result};
use crate::domain::model::{Module, ModuleDraft, Program, Specialization};
use crate::utils::error::SchedulerError;
use crate::utils::validation::validate_non_empty_string;
use std::sync::Arc;

/// Module listing and maintenance, gated by an explicit [`AccessContext`].
pub struct ModuleCatalog<S> {
    store: Arc<S>,
    modules: Vec<Module>,
    programs: Vec<Program>,
    specializations: Vec<Specialization>,
}

impl<S> ModuleCatalog<S>
where
    S: EntityDirectory + ModuleStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            modules: Vec::new(),
            programs: Vec::new(),
            specializations: Vec::new(),
        }
    }

    pub async fn load(&mut self) {
        let store = &*self.store;
        let (modules, programs, specializations) = tokio::join!(
            store.get_modules(),
            store.get_programs(),
            store.get_specializations(),
        );
        self.modules = settle("modules", modules);
        self.programs = settle("programs", programs);
        self.specializations = settle("specializations", specializations);
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn specializations(&self) -> &[Specialization] {
        &self.specializations
    }

    pub fn get(&self, module_code: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.module_code == module_code)
    }

    /// Modules the caller may see whose name or code contains `query`,
    /// ignoring case.
    pub fn visible(&self, ctx: &AccessContext, query: &str) -> Vec<&Module> {
        let query = query.trim().to_lowercase();
        self.modules
            .iter()
            .filter(|m| ctx.can_see(m))
            .filter(|m| {
                m.name.to_lowercase().contains(&query)
                    || m.module_code.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub async fn create(&mut self, ctx: &AccessContext, draft: &ModuleDraft) -> Result<Module> {
        if !ctx.can_create() || !ctx.can_edit_program(draft.program_id) {
            return Err(SchedulerError::Forbidden {
                message: format!("{:?} may not create module {}", ctx.role, draft.module_code),
            });
        }
        validate_non_empty_string("module_code", &draft.module_code)?;
        validate_non_empty_string("name", &draft.name)?;

        let stored = self.store.create_module(draft).await?;
        tracing::info!("Created module {}", stored.module_code);
        self.load().await;
        Ok(stored)
    }

    /// The caller must be allowed to edit both the current module and the
    /// program the draft assigns it to.
    pub async fn update(
        &mut self,
        ctx: &AccessContext,
        module_code: &str,
        draft: &ModuleDraft,
    ) -> Result<Module> {
        let current = self
            .get(module_code)
            .ok_or_else(|| SchedulerError::not_found("Module", module_code))?;
        if !ctx.can_edit(current) || !ctx.can_edit_program(draft.program_id) {
            return Err(SchedulerError::Forbidden {
                message: format!("{:?} may not modify module {}", ctx.role, module_code),
            });
        }
        validate_non_empty_string("name", &draft.name)?;

        let stored = self.store.update_module(module_code, draft).await?;
        tracing::info!("Updated module {}", module_code);
        self.load().await;
        Ok(stored)
    }

    pub async fn delete(&mut self, ctx: &AccessContext, module_code: &str) -> Result<()> {
        let current = self
            .get(module_code)
            .ok_or_else(|| SchedulerError::not_found("Module", module_code))?;
        if !ctx.can_delete(current) {
            return Err(SchedulerError::Forbidden {
                message: format!("{:?} may not delete module {}", ctx.role, module_code),
            });
        }

        self.store.delete_module(module_code).await?;
        tracing::info!("Deleted module {}", module_code);
        self.modules.retain(|m| m.module_code != module_code);
        self.load().await;
        Ok(())
    }
}
