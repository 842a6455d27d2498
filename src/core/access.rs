use crate::domain::model::Module;
use crate::utils::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(rename = "pm")]
    ProgramManager,
    #[serde(rename = "hosp")]
    HeadOfStudyProgram,
    Lecturer,
    Student,
}

impl FromStr for Role {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "pm" => Ok(Self::ProgramManager),
            "hosp" => Ok(Self::HeadOfStudyProgram),
            "lecturer" => Ok(Self::Lecturer),
            "student" => Ok(Self::Student),
            other => Err(SchedulerError::validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Who is acting, handed to every module-catalog operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    pub role: Role,
    pub managed_program_ids: HashSet<i64>,
    pub enrolled_module_codes: HashSet<String>,
    pub taught_module_codes: HashSet<String>,
}

impl AccessContext {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            managed_program_ids: HashSet::new(),
            enrolled_module_codes: HashSet::new(),
            taught_module_codes: HashSet::new(),
        }
    }

    pub fn managing(mut self, program_ids: impl IntoIterator<Item = i64>) -> Self {
        self.managed_program_ids.extend(program_ids);
        self
    }

    pub fn enrolled_in<I, T>(mut self, module_codes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.enrolled_module_codes
            .extend(module_codes.into_iter().map(Into::into));
        self
    }

    pub fn teaching<I, T>(mut self, module_codes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.taught_module_codes
            .extend(module_codes.into_iter().map(Into::into));
        self
    }

    pub fn can_create(&self) -> bool {
        matches!(
            self.role,
            Role::Admin | Role::ProgramManager | Role::HeadOfStudyProgram
        )
    }

    /// Program managers edit anything; a head of study program only the
    /// modules of programs they manage.
    pub fn can_edit_program(&self, program_id: Option<i64>) -> bool {
        match self.role {
            Role::Admin | Role::ProgramManager => true,
            Role::HeadOfStudyProgram => {
                program_id.is_some_and(|id| self.managed_program_ids.contains(&id))
            }
            Role::Lecturer | Role::Student => false,
        }
    }

    pub fn can_edit(&self, module: &Module) -> bool {
        self.can_edit_program(module.program_id)
    }

    pub fn can_delete(&self, module: &Module) -> bool {
        self.can_edit(module)
    }

    pub fn can_see(&self, module: &Module) -> bool {
        match self.role {
            Role::Student => self.enrolled_module_codes.contains(&module.module_code),
            Role::Lecturer => self.taught_module_codes.contains(&module.module_code),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(code: &str, program_id: Option<i64>) -> Module {
        Module {
            module_code: code.to_string(),
            name: code.to_string(),
            ects: 5,
            semester: 1,
            room_type: "Seminar".to_string(),
            assessment_type: None,
            category: None,
            program_id,
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("PM".parse::<Role>().unwrap(), Role::ProgramManager);
        assert_eq!("HoSP".parse::<Role>().unwrap(), Role::HeadOfStudyProgram);
        assert!("dean".parse::<Role>().is_err());
    }

    #[test]
    fn test_hosp_edits_only_managed_programs() {
        let ctx = AccessContext::new(Role::HeadOfStudyProgram).managing([2]);
        assert!(ctx.can_create());
        assert!(ctx.can_edit(&module("GD200", Some(2))));
        assert!(!ctx.can_edit(&module("CS100", Some(1))));
        assert!(!ctx.can_delete(&module("XX000", None)));
    }

    #[test]
    fn test_students_and_lecturers_are_read_only() {
        let student = AccessContext::new(Role::Student).enrolled_in(["CS100"]);
        assert!(!student.can_create());
        assert!(student.can_see(&module("CS100", Some(1))));
        assert!(!student.can_see(&module("CS200", Some(1))));

        let lecturer = AccessContext::new(Role::Lecturer).teaching(["CS200"]);
        assert!(!lecturer.can_edit(&module("CS200", Some(1))));
        assert!(lecturer.can_see(&module("CS200", Some(1))));
    }
}
