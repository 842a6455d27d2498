use crate::utils::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target value meaning "every entity at this level".
pub const GLOBAL_TARGET: &str = "0";
pub const GLOBAL_TARGET_LABEL: &str = "Global (All)";

pub const ROOM_TYPES: [&str; 4] = ["Lecture Classroom", "Computer Lab", "Game Design", "Seminar"];
pub const WEEKDAY_NAMES: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Scope a constraint applies to. Stored records may carry levels this
/// crate does not manage; those are kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConstraintLevel {
    #[default]
    Global,
    Lecturer,
    Group,
    Module,
    Room,
    Other(String),
}

impl ConstraintLevel {
    pub const ALL: [ConstraintLevel; 5] = [
        ConstraintLevel::Global,
        ConstraintLevel::Lecturer,
        ConstraintLevel::Group,
        ConstraintLevel::Module,
        ConstraintLevel::Room,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Global => "Global",
            Self::Lecturer => "Lecturer",
            Self::Group => "Group",
            Self::Module => "Module",
            Self::Room => "Room",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for ConstraintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Strict parse for user input: only the managed levels are accepted.
impl FromStr for ConstraintLevel {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SchedulerError::validation(format!("Unknown constraint level: {}", s)))
    }
}

impl From<String> for ConstraintLevel {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Self::Other(value))
    }
}

impl From<ConstraintLevel> for String {
    fn from(level: ConstraintLevel) -> Self {
        match level {
            ConstraintLevel::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Teaching days shown on the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        WEEKDAY_NAMES[*self as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SchedulerError::validation(format!("Unknown weekday: {}", s)))
    }
}

/// How a constraint type's rule payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    RoomType,
    WeekdayRestriction,
    FreeForm,
}

impl ConstraintKind {
    /// Derives a kind from a type's display name, for catalog records that
    /// carry no explicit kind.
    pub fn classify(type_name: &str) -> Self {
        if type_name.contains("Room Type") {
            Self::RoomType
        } else if type_name.contains("Day") || type_name.contains("Unavailable") {
            Self::WeekdayRestriction
        } else {
            Self::FreeForm
        }
    }

    pub fn rule_domain(self) -> RuleDomain {
        match self {
            Self::RoomType => RuleDomain::RoomType,
            Self::WeekdayRestriction => RuleDomain::Weekday,
            Self::FreeForm => RuleDomain::FreeText,
        }
    }
}

/// The legal universe of `constraint_rule` values for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleDomain {
    RoomType,
    Weekday,
    FreeText,
}

impl RuleDomain {
    /// Enumerated values, or `None` when the rule is free text.
    pub fn values(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::RoomType => Some(&ROOM_TYPES),
            Self::Weekday => Some(&WEEKDAY_NAMES),
            Self::FreeText => None,
        }
    }

    /// An empty rule is always admitted.
    pub fn admits(&self, rule: &str) -> bool {
        match self.values() {
            Some(values) => rule.is_empty() || values.contains(&rule),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintType {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConstraintKind>,
}

impl ConstraintType {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: ConstraintKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn resolved_kind(&self) -> ConstraintKind {
        self.kind
            .unwrap_or_else(|| ConstraintKind::classify(&self.name))
    }

    pub fn rule_domain(&self) -> RuleDomain {
        self.resolved_kind().rule_domain()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: i64,
    pub constraint_type_id: i64,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub constraint_level: ConstraintLevel,
    #[serde(default = "wire::global_target", deserialize_with = "wire::target_id")]
    pub constraint_target: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub constraint_rule: String,
    #[serde(default = "wire::enabled", deserialize_with = "wire::null_as_enabled")]
    pub active: bool,
}

impl Constraint {
    pub fn applies_to_all(&self) -> bool {
        self.constraint_target == GLOBAL_TARGET
    }
}

/// Body of `createConstraint` / `updateConstraint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintPayload {
    pub constraint_type_id: i64,
    pub constraint_level: ConstraintLevel,
    pub constraint_target: String,
    pub constraint_rule: String,
    pub active: bool,
}

/// An unsaved or edited constraint. `id` is `None` for a new rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintDraft {
    pub id: Option<i64>,
    pub constraint_type_id: i64,
    pub constraint_level: ConstraintLevel,
    pub constraint_target: String,
    pub constraint_rule: String,
    pub active: bool,
}

impl ConstraintDraft {
    pub fn new(constraint_type_id: i64) -> Self {
        Self {
            id: None,
            constraint_type_id,
            constraint_level: ConstraintLevel::Global,
            constraint_target: GLOBAL_TARGET.to_string(),
            constraint_rule: String::new(),
            active: true,
        }
    }

    pub fn from_constraint(constraint: &Constraint) -> Self {
        Self {
            id: Some(constraint.id),
            constraint_type_id: constraint.constraint_type_id,
            constraint_level: constraint.constraint_level.clone(),
            constraint_target: constraint.constraint_target.clone(),
            constraint_rule: constraint.constraint_rule.clone(),
            active: constraint.active,
        }
    }

    /// Switching level invalidates any target picked from the previous pool.
    pub fn with_level(mut self, level: ConstraintLevel) -> Self {
        self.constraint_level = level;
        self.constraint_target = GLOBAL_TARGET.to_string();
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.constraint_target = target.into();
        self
    }

    /// Changes the type and clears the rule when the new type's domain
    /// does not admit it.
    pub fn with_type(mut self, constraint_type: &ConstraintType) -> Self {
        self.constraint_type_id = constraint_type.id;
        if !constraint_type.rule_domain().admits(&self.constraint_rule) {
            self.constraint_rule.clear();
        }
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.constraint_rule = rule.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn payload(&self) -> ConstraintPayload {
        ConstraintPayload {
            constraint_type_id: self.constraint_type_id,
            constraint_level: self.constraint_level.clone(),
            constraint_target: self.constraint_target.clone(),
            constraint_rule: self.constraint_rule.clone(),
            active: self.active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOption {
    pub id: String,
    pub name: String,
}

impl TargetOption {
    pub fn new(id: impl ToString, name: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.into(),
        }
    }

    pub fn global() -> Self {
        Self::new(GLOBAL_TARGET, GLOBAL_TARGET_LABEL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecturer {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Lecturer {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name.as_deref().unwrap_or(""))
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub module_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ects: u32,
    #[serde(default)]
    pub semester: u32,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub assessment_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub program_id: Option<i64>,
}

/// Body of `createModule` / `updateModule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDraft {
    pub module_code: String,
    pub name: String,
    pub ects: u32,
    pub semester: u32,
    pub category: String,
    pub room_type: String,
    pub assessment_type: String,
    pub program_id: Option<i64>,
    #[serde(default)]
    pub specialization_ids: Vec<i64>,
}

impl ModuleDraft {
    pub fn new(module_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module_code: module_code.into(),
            name: name.into(),
            ects: 5,
            semester: 1,
            category: "Core".to_string(),
            room_type: ROOM_TYPES[0].to_string(),
            assessment_type: "Written Exam".to_string(),
            program_id: None,
            specialization_ids: Vec::new(),
        }
    }

    pub fn with_program(mut self, program_id: i64) -> Self {
        self.program_id = Some(program_id);
        self
    }

    pub fn from_module(module: &Module) -> Self {
        Self {
            module_code: module.module_code.clone(),
            name: module.name.clone(),
            ects: module.ects,
            semester: module.semester,
            category: module.category.clone().unwrap_or_else(|| "Core".to_string()),
            room_type: module.room_type.clone(),
            assessment_type: module
                .assessment_type
                .clone()
                .unwrap_or_else(|| "Written Exam".to_string()),
            program_id: module.program_id,
            specialization_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(rename = "type", default)]
    pub room_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub acronym: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialization {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub acronym: Option<String>,
}

/// A module taught by a specific lecturer in a given semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferedModule {
    pub id: i64,
    #[serde(default)]
    pub module_name: String,
    #[serde(default)]
    pub lecturer_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: i64,
    pub offered_module_id: i64,
    pub room_id: i64,
    pub day_of_week: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub semester: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecturer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
}

/// Body of `createScheduleEntry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScheduleEntry {
    pub offered_module_id: i64,
    pub room_id: i64,
    pub day_of_week: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub semester: String,
}

/// Which coordinates make a timetable slot unique within a semester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum OccupancyKey {
    /// One session per day and hour, whatever the room.
    #[default]
    DayHour,
    /// One session per day, hour and room.
    DayHourRoom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSettings {
    pub session_minutes: u32,
    pub first_hour: u32,
    pub last_hour: u32,
    pub occupancy: OccupancyKey,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            session_minutes: 60,
            first_hour: 8,
            last_hour: 20,
            occupancy: OccupancyKey::DayHour,
        }
    }
}

mod wire {
    use super::GLOBAL_TARGET;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TargetRepr {
        Text(String),
        Number(i64),
    }

    pub fn global_target() -> String {
        GLOBAL_TARGET.to_string()
    }

    pub fn enabled() -> bool {
        true
    }

    pub fn target_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Option::<TargetRepr>::deserialize(deserializer)? {
            Some(TargetRepr::Text(text)) if !text.is_empty() => text,
            Some(TargetRepr::Number(number)) => number.to_string(),
            _ => global_target(),
        })
    }

    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub fn null_as_enabled<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing_is_case_insensitive() {
        assert_eq!("LECTURER".parse::<ConstraintLevel>().unwrap(), ConstraintLevel::Lecturer);
        assert_eq!("room".parse::<ConstraintLevel>().unwrap(), ConstraintLevel::Room);
        assert!("Program".parse::<ConstraintLevel>().is_err());
    }

    #[test]
    fn test_unmanaged_level_is_kept_verbatim() {
        let json = serde_json::json!([
            {"id": 1, "constraint_type_id": 1, "constraint_level": "Global",
             "constraint_target": "0", "constraint_rule": "", "active": true},
            {"id": 2, "constraint_type_id": 1, "constraint_level": "Program",
             "constraint_target": 3, "constraint_rule": "Seminar", "active": true}
        ]);
        let constraints: Vec<Constraint> = serde_json::from_value(json).unwrap();
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints[0].constraint_level, ConstraintLevel::Global);
        assert_eq!(
            constraints[1].constraint_level,
            ConstraintLevel::Other("Program".to_string())
        );
        assert!(!constraints[1].constraint_level.is_known());

        let payload = ConstraintDraft::from_constraint(&constraints[1]).payload();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["constraint_level"], "Program");
        assert_eq!(format!("{:<8}|", ConstraintLevel::Room), "Room    |");
    }

    #[test]
    fn test_constraint_wire_defaults() {
        let json = serde_json::json!({
            "id": 3,
            "constraint_type_id": 2,
            "constraint_level": null,
            "constraint_target": null,
            "constraint_rule": null
        });
        let constraint: Constraint = serde_json::from_value(json).unwrap();
        assert_eq!(constraint.constraint_level, ConstraintLevel::Global);
        assert_eq!(constraint.constraint_target, GLOBAL_TARGET);
        assert_eq!(constraint.constraint_rule, "");
        assert!(constraint.active);
    }

    #[test]
    fn test_numeric_target_is_read_as_string() {
        let json = serde_json::json!({
            "id": 1,
            "constraint_type_id": 1,
            "constraint_level": "Room",
            "constraint_target": 12,
            "constraint_rule": "Computer Lab",
            "active": false
        });
        let constraint: Constraint = serde_json::from_value(json).unwrap();
        assert_eq!(constraint.constraint_target, "12");
        assert!(!constraint.active);
        assert!(!constraint.applies_to_all());
    }

    #[test]
    fn test_level_change_resets_target() {
        let draft = ConstraintDraft::new(1)
            .with_level(ConstraintLevel::Lecturer)
            .with_target("4")
            .with_level(ConstraintLevel::Room);
        assert_eq!(draft.constraint_target, GLOBAL_TARGET);
        assert_eq!(draft.constraint_level, ConstraintLevel::Room);
    }

    #[test]
    fn test_type_change_clears_inadmissible_rule() {
        let room_type = ConstraintType::new(1, "Room Type Restriction");
        let unavailable = ConstraintType::new(2, "Lecturer Unavailable Day");
        let max_hours = ConstraintType::new(3, "Max Hours");

        let draft = ConstraintDraft::new(1).with_rule("Computer Lab").with_type(&room_type);
        assert_eq!(draft.constraint_rule, "Computer Lab");

        let draft = draft.with_type(&unavailable);
        assert_eq!(draft.constraint_rule, "");

        let draft = draft.with_rule("Friday").with_type(&max_hours);
        assert_eq!(draft.constraint_rule, "Friday");
    }

    #[test]
    fn test_explicit_kind_overrides_name() {
        let ty = ConstraintType::new(9, "Preferred Day Off").with_kind(ConstraintKind::FreeForm);
        assert_eq!(ty.rule_domain(), RuleDomain::FreeText);
        assert_eq!(
            ConstraintType::new(9, "Preferred Day Off").rule_domain(),
            RuleDomain::Weekday
        );
    }

    #[test]
    fn test_lecturer_display_name() {
        let lecturer = Lecturer {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: None,
            title: None,
        };
        assert_eq!(lecturer.display_name(), "Ada");
    }

    #[test]
    fn test_entry_serializes_weekday_label() {
        let entry = NewScheduleEntry {
            offered_module_id: 1,
            room_id: 2,
            day_of_week: Weekday::Wednesday,
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            semester: "2024S1".to_string(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["day_of_week"], "Wednesday");
    }
}
