use crate::core::directory::settle;
use crate::core::{EntityDirectory, Result, ScheduleStore};
use crate::domain::model::{
    GridSettings, NewScheduleEntry, OccupancyKey, OfferedModule, Room, TimetableEntry, Weekday,
};
use crate::utils::error::SchedulerError;
use crate::utils::validation::validate_non_empty_string;
use chrono::{Duration, NaiveTime, Timelike};
use std::collections::HashMap;
use std::sync::Arc;

fn parse_start(start_time: &str) -> Result<NaiveTime> {
    let trimmed = start_time.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| SchedulerError::validation(format!("Invalid start time: {}", start_time)))
}

/// Two-digit hour that identifies the slot a start time falls in.
/// `"09:30"` and `"09:00"` both give `"09"`.
pub fn hour_prefix(start_time: &str) -> Result<String> {
    Ok(format!("{:02}", parse_start(start_time)?.hour()))
}

/// End of a session of `minutes` starting at `start_time`, as `HH:MM`.
pub fn session_end(start_time: &str, minutes: u32) -> Result<String> {
    let start = parse_start(start_time)?;
    let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    if wrapped != 0 {
        return Err(SchedulerError::validation(format!(
            "A {} minute session starting at {} runs past midnight",
            minutes, start_time
        )));
    }
    Ok(end.format("%H:%M").to_string())
}

/// Occupancy map of placed sessions, per semester.
pub struct TimetableGrid<S> {
    store: Arc<S>,
    settings: GridSettings,
    entries: HashMap<String, Vec<TimetableEntry>>,
    offered_modules: HashMap<String, Vec<OfferedModule>>,
    rooms: Vec<Room>,
}

impl<S> TimetableGrid<S>
where
    S: ScheduleStore + EntityDirectory,
{
    pub fn new(store: Arc<S>, settings: GridSettings) -> Self {
        Self {
            store,
            settings,
            entries: HashMap::new(),
            offered_modules: HashMap::new(),
            rooms: Vec::new(),
        }
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// First semester offered by the directory, if any could be fetched.
    pub async fn default_semester(&self) -> Option<String> {
        settle("semesters", self.store.get_semesters().await)
            .into_iter()
            .next()
            .map(|s| s.name)
    }

    /// Loads the schedule together with the module and room pickers.
    /// Picker fetches may fail on their own; a schedule failure is returned.
    pub async fn load_semester(&mut self, semester: &str) -> Result<()> {
        let store = &*self.store;
        let (schedule, offered, rooms) = tokio::join!(
            store.get_schedule(semester),
            store.get_offered_modules(semester),
            store.get_rooms(),
        );

        self.offered_modules
            .insert(semester.to_string(), settle("offered modules", offered));
        self.rooms = settle("rooms", rooms);

        let schedule = schedule?;
        tracing::debug!("Loaded {} entries for {}", schedule.len(), semester);
        self.entries.insert(semester.to_string(), schedule);
        Ok(())
    }

    pub async fn reload_schedule(&mut self, semester: &str) -> Result<()> {
        let schedule = self.store.get_schedule(semester).await?;
        tracing::debug!("Reloaded {} entries for {}", schedule.len(), semester);
        self.entries.insert(semester.to_string(), schedule);
        Ok(())
    }

    pub fn for_semester(&self, semester: &str) -> &[TimetableEntry] {
        self.entries.get(semester).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn offered_modules(&self, semester: &str) -> &[OfferedModule] {
        self.offered_modules
            .get(semester)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Hour labels of the time axis, `first_hour:00` through `last_hour:00`.
    pub fn hours(&self) -> Vec<String> {
        (self.settings.first_hour..=self.settings.last_hour)
            .map(|hour| format!("{:02}:00", hour))
            .collect()
    }

    /// Every session starting in the same hour on `day`. With room-aware
    /// occupancy there can be one per room.
    pub fn entries_at<'a>(
        &'a self,
        semester: &str,
        day: Weekday,
        start_time: &str,
    ) -> impl Iterator<Item = &'a TimetableEntry> + 'a {
        let prefix = hour_prefix(start_time).ok();
        self.for_semester(semester).iter().filter(move |e| {
            e.day_of_week == day
                && prefix
                    .as_deref()
                    .is_some_and(|p| e.start_time.starts_with(p))
        })
    }

    pub fn entry_at(&self, semester: &str, day: Weekday, start_time: &str) -> Option<&TimetableEntry> {
        self.entries_at(semester, day, start_time).next()
    }

    pub fn entry_at_room(
        &self,
        semester: &str,
        day: Weekday,
        start_time: &str,
        room_id: i64,
    ) -> Option<&TimetableEntry> {
        let prefix = hour_prefix(start_time).ok()?;
        self.for_semester(semester).iter().find(|e| {
            e.day_of_week == day && e.room_id == room_id && e.start_time.starts_with(&prefix)
        })
    }

    fn occupant(
        &self,
        semester: &str,
        day: Weekday,
        start_time: &str,
        room_id: i64,
    ) -> Option<&TimetableEntry> {
        match self.settings.occupancy {
            OccupancyKey::DayHour => self.entry_at(semester, day, start_time),
            OccupancyKey::DayHourRoom => self.entry_at_room(semester, day, start_time, room_id),
        }
    }

    pub async fn place(
        &mut self,
        semester: &str,
        day: Weekday,
        start_time: &str,
        offered_module_id: Option<i64>,
        room_id: Option<i64>,
    ) -> Result<TimetableEntry> {
        let offered_module_id = offered_module_id.ok_or_else(|| SchedulerError::MissingSelection {
            field: "offered_module_id".to_string(),
        })?;
        let room_id = room_id.ok_or_else(|| SchedulerError::MissingSelection {
            field: "room_id".to_string(),
        })?;
        validate_non_empty_string("semester", semester)?;
        let end_time = session_end(start_time, self.settings.session_minutes)?;

        if !self.entries.contains_key(semester) {
            self.reload_schedule(semester).await?;
        }
        if let Some(existing) = self.occupant(semester, day, start_time, room_id) {
            return Err(SchedulerError::SlotOccupied {
                semester: semester.to_string(),
                day: day.to_string(),
                start_time: start_time.to_string(),
                entry_id: existing.id,
            });
        }

        let request = NewScheduleEntry {
            offered_module_id,
            room_id,
            day_of_week: day,
            start_time: start_time.trim().to_string(),
            end_time,
            semester: semester.to_string(),
        };
        let stored = self.store.create_schedule_entry(&request).await?;
        tracing::info!(
            "Placed entry {} on {} {}-{} ({})",
            stored.id,
            stored.day_of_week,
            stored.start_time,
            stored.end_time,
            semester
        );

        self.entries
            .entry(semester.to_string())
            .or_default()
            .push(stored.clone());
        if let Err(e) = self.reload_schedule(semester).await {
            tracing::warn!("Could not reload {} after placement: {}", semester, e);
        }
        Ok(stored)
    }

    pub async fn remove(&mut self, entry_id: i64) -> Result<()> {
        let semester = self
            .entries
            .iter()
            .find(|(_, entries)| entries.iter().any(|e| e.id == entry_id))
            .map(|(semester, _)| semester.clone())
            .ok_or_else(|| SchedulerError::not_found("Timetable entry", entry_id))?;

        self.store.delete_schedule_entry(entry_id).await?;
        tracing::info!("Removed entry {} from {}", entry_id, semester);

        if let Some(entries) = self.entries.get_mut(&semester) {
            entries.retain(|e| e.id != entry_id);
        }
        if let Err(e) = self.reload_schedule(&semester).await {
            tracing::warn!("Could not reload {} after removal: {}", semester, e);
        }
        Ok(())
    }
}
