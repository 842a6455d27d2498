use crate::core::grid::TimetableGrid;
use crate::core::registry::ConstraintRegistry;
use crate::core::{ConstraintStore, EntityDirectory, ScheduleStore};
use crate::domain::model::{TargetOption, Weekday};
use std::fmt::Write;

const CELL_WIDTH: usize = 30;
const TIME_WIDTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PastelColor {
    pub background: &'static str,
    pub border: &'static str,
    pub text: &'static str,
}

pub const PALETTE: [PastelColor; 6] = [
    PastelColor { background: "#fff9c4", border: "#fbc02d", text: "#5d4037" },
    PastelColor { background: "#c8e6c9", border: "#43a047", text: "#1b5e20" },
    PastelColor { background: "#bbdefb", border: "#1976d2", text: "#0d47a1" },
    PastelColor { background: "#f8bbd0", border: "#c2185b", text: "#880e4f" },
    PastelColor { background: "#e1bee7", border: "#7b1fa2", text: "#4a148c" },
    PastelColor { background: "#ffe0b2", border: "#f57c00", text: "#e65100" },
];

/// Same module name, same color. Hashes UTF-16 units with the
/// `c + (h << 5) - h` recurrence, the shift taken on 32 bits.
pub fn color_for_module(module_name: Option<&str>) -> &'static PastelColor {
    let name = match module_name {
        Some(name) if !name.is_empty() => name,
        _ => return &PALETTE[0],
    };

    let mut hash: i64 = 0;
    for unit in name.encode_utf16() {
        let shifted = i64::from((hash as i32) << 5);
        hash = i64::from(unit) + (shifted - hash);
    }
    &PALETTE[(hash.unsigned_abs() % PALETTE.len() as u64) as usize]
}

fn fit(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - len));
    out
}

pub fn render_grid<S>(grid: &TimetableGrid<S>, semester: &str) -> String
where
    S: ScheduleStore + EntityDirectory,
{
    let mut out = String::new();
    let _ = writeln!(out, "Schedule {} ({} sessions)", semester, grid.for_semester(semester).len());

    let mut header = fit("", TIME_WIDTH);
    for day in Weekday::ALL {
        header.push_str(&fit(day.as_str(), CELL_WIDTH));
    }
    let _ = writeln!(out, "{}", header.trim_end());

    for hour in grid.hours() {
        let cells: Vec<Vec<_>> = Weekday::ALL
            .iter()
            .map(|day| grid.entries_at(semester, *day, &hour).collect())
            .collect();
        let depth = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);

        for row in 0..depth {
            let mut title = fit(if row == 0 { hour.as_str() } else { "" }, TIME_WIDTH);
            let mut detail = fit("", TIME_WIDTH);
            for cell in &cells {
                match cell.get(row) {
                    Some(entry) => {
                        let module = entry.module_name.as_deref().unwrap_or("?");
                        let lecturer = entry.lecturer_name.as_deref().unwrap_or("");
                        let room = entry.room_name.as_deref().unwrap_or("");
                        title.push_str(&fit(&format!("[{}] {}", entry.id, module), CELL_WIDTH));
                        detail.push_str(&fit(&format!("{} @ {}", lecturer, room), CELL_WIDTH));
                    }
                    None => {
                        title.push_str(&fit("", CELL_WIDTH));
                        detail.push_str(&fit("", CELL_WIDTH));
                    }
                }
            }
            let _ = writeln!(out, "{}", title.trim_end());
            if !detail.trim().is_empty() {
                let _ = writeln!(out, "{}", detail.trim_end());
            }
        }
    }
    out
}

pub fn render_constraints<S>(registry: &ConstraintRegistry<S>) -> String
where
    S: ConstraintStore + EntityDirectory,
{
    let mut out = String::new();
    let _ = writeln!(out, "{:<6}{:<32}{:<10}{:<24}Status", "ID", "Type", "Level", "Target");
    for constraint in registry.list_constraints() {
        let _ = writeln!(
            out,
            "{:<6}{:<32}{:<10}{:<24}{}",
            constraint.id,
            registry.type_name(constraint),
            constraint.constraint_level,
            registry.target_label(constraint),
            if constraint.active { "Active" } else { "Inactive" }
        );
    }
    out
}

pub fn render_targets(pool: &[TargetOption]) -> String {
    if pool.is_empty() {
        return "(no targets)\n".to_string();
    }
    pool.iter().fold(String::new(), |mut out, target| {
        let _ = writeln!(out, "{}\t{}", target.id, target.name);
        out
    })
}
