// hackops-service/src/services/schedule_service.rs
//! Judging schedule views derived from the flat assignment list.
//!
//! Nothing here touches storage: both views are recomputed from whatever
//! assignment slice they are handed.

use crate::models::{
    Assignment, GridCell, GridRow, JudgeRow, OrganizerSchedule, ProjectLink, RoomConfig,
};
use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Utc};
use log::warn;
use std::collections::HashMap;

const TIME_OF_DAY: &str = "%-I:%M %p";

// Rooms are numbered from 1 and joined through `{url_base}{n}`
pub fn build_rooms(count: usize, url_base: &str) -> Vec<RoomConfig> {
    (1..=count)
        .map(|n| RoomConfig {
            id: format!("room-{}", n),
            label: format!("Room {}", n),
            url: format!("{}{}", url_base, n),
        })
        .collect()
}

/// Reshape assignments into one row per distinct `time` string.
///
/// Rows come out in the order their time first appears in `assignments`, and
/// every row has one cell per configured room. Times are compared as raw
/// strings, so two spellings of the same instant make two rows. When two
/// assignments share a time and room the later one wins.
pub fn organizer_grid(assignments: &[Assignment], rooms: &[RoomConfig]) -> Vec<GridRow> {
    let mut row_index: HashMap<&str, usize> = HashMap::new();
    let mut slots: Vec<(&str, Vec<Option<&Assignment>>)> = Vec::new();

    for assignment in assignments {
        let row = *row_index.entry(assignment.time.as_str()).or_insert_with(|| {
            slots.push((assignment.time.as_str(), vec![None; rooms.len()]));
            slots.len() - 1
        });

        match rooms.iter().position(|room| room.id == assignment.room) {
            Some(column) => slots[row].1[column] = Some(assignment),
            None => warn!(
                "⚠️ Assignment for team {} names unknown room {}, leaving it off the grid",
                assignment.team_id, assignment.room
            ),
        }
    }

    slots
        .into_iter()
        .map(|(time, cells)| GridRow {
            time: time.to_string(),
            display_time: format_time_of_day(time),
            cells: rooms
                .iter()
                .zip(cells)
                .map(|(room, assignment)| GridCell {
                    room: room.id.clone(),
                    assignment: assignment.cloned(),
                })
                .collect(),
        })
        .collect()
}

pub fn organizer_schedule(assignments: &[Assignment], rooms: &[RoomConfig]) -> OrganizerSchedule {
    OrganizerSchedule {
        rooms: rooms.to_vec(),
        rows: organizer_grid(assignments, rooms),
    }
}

/// One row per assignment, skipping the first `cutoff` unless `show_past`.
pub fn judge_schedule(
    assignments: &[Assignment],
    cutoff: usize,
    show_past: bool,
    judging_form_path: &str,
) -> Vec<JudgeRow> {
    let start = if show_past {
        0
    } else {
        cutoff.min(assignments.len())
    };

    assignments[start..]
        .iter()
        .map(|a| JudgeRow {
            time: a.time.clone(),
            display_time: format_time_of_day(&a.time),
            project: ProjectLink {
                name: a.team_name.clone(),
                link: a.devpost.clone(),
            },
            team_members: a.member_names.clone(),
            judges: a.judges.iter().map(|judge| judge.name.clone()).collect(),
            form: format!("{}?id={}", judging_form_path, a.team_id),
            room: a.zoom.clone(),
        })
        .collect()
}

/// Count of leading assignments that started before `now`.
///
/// Assumes `assignments` is chronological; the count stops at the first entry
/// that is not in the past or whose time has no date.
pub fn cutoff_index(assignments: &[Assignment], now: DateTime<Utc>) -> usize {
    assignments
        .iter()
        .take_while(|a| matches!(parse_instant(&a.time), Some(t) if t < now))
        .count()
}

fn parse_instant(time: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_naive_datetime(time).map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_naive_datetime(time: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(time, fmt).ok())
}

/// Render an ISO time as a 12-hour clock time, e.g. `9:05 AM`.
///
/// Offsets are kept as given rather than converted. Values that are not a
/// date-time or a bare `HH:MM[:SS]` come back unchanged.
pub fn format_time_of_day(time: &str) -> String {
    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(time) {
        return dt.format(TIME_OF_DAY).to_string();
    }
    if let Some(naive) = parse_naive_datetime(time) {
        return naive.format(TIME_OF_DAY).to_string();
    }
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())
        .map(|t| t.format(TIME_OF_DAY).to_string())
        .unwrap_or_else(|| time.to_string())
}
