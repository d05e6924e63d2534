//! Layout of the conference program as a fixed time × room grid.
//!
//! Activities have arbitrary durations; the display axis is a uniform run of
//! 30-minute slots. An activity renders once, as a card spanning several
//! rows, and the rows underneath it must know they are already covered so
//! the table does not emit a cell for them. Everything here is recomputed
//! per render from the freshly fetched list; nothing is cached.

use serde::Deserialize;
use thiserror::Error;

use crate::models::{Activity, Category, Room, TimeOfDay};

pub const WINDOW_START: TimeOfDay = TimeOfDay::new(10, 0);
pub const WINDOW_END: TimeOfDay = TimeOfDay::new(19, 0);
pub const STEP_MINUTES: u16 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("interval must end after it starts ({start}–{end})")]
    InvalidInterval { start: TimeOfDay, end: TimeOfDay },

    #[error("{room}: two activities share the {start} start")]
    DuplicateStart { room: &'static str, start: TimeOfDay },

    #[error("{room}: `{first}` overlaps `{second}`")]
    Overlap {
        room: &'static str,
        first: String,
        second: String,
    },
}

/// State of one `(room, slot)` cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    /// An activity starts exactly at this slot and spans `row_span` rows.
    Start {
        activity: &'a Activity,
        row_span: u32,
    },
    /// An earlier-starting activity is still running; render nothing.
    Covered,
    Empty,
}

/// Slot-start labels from `start` to `end` inclusive, stepping by
/// `step_minutes`. When the window is not an integer number of steps the
/// final boundary label is still included, so the last slot is partial
/// rather than missing.
pub fn build_time_slots(start: TimeOfDay, end: TimeOfDay, step_minutes: u16) -> Vec<TimeOfDay> {
    let mut slots = Vec::new();
    if end < start || step_minutes == 0 {
        return slots;
    }
    let mut t = start;
    while t < end {
        slots.push(t);
        t = t.plus_minutes(step_minutes);
    }
    slots.push(end);
    slots
}

/// Number of slot rows an interval occupies: `ceil((end - start) / step)`.
/// Always ≥ 1 for a valid interval; an empty or reversed interval is an
/// error, never a zero span. A zero step cannot represent any interval.
pub fn row_span(start: TimeOfDay, end: TimeOfDay, step_minutes: u16) -> Result<u32, ScheduleError> {
    if end <= start || step_minutes == 0 {
        return Err(ScheduleError::InvalidInterval { start, end });
    }
    let duration = (end.minutes() - start.minutes()) as u32;
    Ok(duration.div_ceil(step_minutes as u32))
}

/// True iff an activity in `room` strictly contains `slot`. An activity
/// starting exactly at `slot` is a start, not coverage.
pub fn is_covered(room: Room, slot: TimeOfDay, activities: &[Activity]) -> bool {
    activities
        .iter()
        .any(|a| a.room == room && a.start < slot && slot < a.end)
}

/// Three-way classification of a cell. Per-cell linear scans are deliberate:
/// the grid is at most a few hundred cells over a few dozen activities, and
/// an index would not pay for itself.
pub fn cell_at<'a>(room: Room, slot: TimeOfDay, activities: &'a [Activity]) -> Cell<'a> {
    if let Some(activity) = activities
        .iter()
        .find(|a| a.room == room && a.start == slot)
    {
        // Intervals are validated before grid assembly; a span of one row is
        // the only sensible rendering if an invalid one slips through.
        let row_span = row_span(activity.start, activity.end, STEP_MINUTES).unwrap_or(1);
        return Cell::Start { activity, row_span };
    }
    if is_covered(room, slot, activities) {
        return Cell::Covered;
    }
    Cell::Empty
}

/// Data-integrity preconditions of the grid: per room, no duplicate starts
/// and no overlapping intervals. Violations are rejected outright. There is
/// no defined tie-break, and a silently wrong grid is worse than no grid.
pub fn validate_schedule(activities: &[Activity]) -> Result<(), ScheduleError> {
    for a in activities {
        if a.end <= a.start {
            return Err(ScheduleError::InvalidInterval {
                start: a.start,
                end: a.end,
            });
        }
    }
    for (i, a) in activities.iter().enumerate() {
        for b in &activities[i + 1..] {
            if a.room != b.room {
                continue;
            }
            if a.start == b.start {
                return Err(ScheduleError::DuplicateStart {
                    room: a.room.label(),
                    start: a.start,
                });
            }
            if a.start < b.end && b.start < a.end {
                return Err(ScheduleError::Overlap {
                    room: a.room.label(),
                    first: a.title.clone(),
                    second: b.title.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Program filter as it arrives in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramFilter {
    pub categoria: Option<String>,
    pub sala: Option<String>,
}

impl ProgramFilter {
    pub fn category(&self) -> Option<Category> {
        self.categoria
            .as_deref()
            .and_then(|c| Category::parse(c).ok())
    }

    pub fn room(&self) -> Option<Room> {
        self.sala.as_deref().and_then(|r| Room::parse(r).ok())
    }
}

/// Pure filter, fully separate from the grid geometry. Coverage and spans
/// are always computed from the unfiltered list; this only decides which
/// Start cells render a populated card.
pub fn select_visible<'a>(activities: &'a [Activity], filter: &ProgramFilter) -> Vec<&'a Activity> {
    let category = filter.category();
    let room = filter.room();
    activities
        .iter()
        .filter(|a| category.map_or(true, |c| a.category == c))
        .filter(|a| room.map_or(true, |r| a.room == r))
        .collect()
}

pub struct GridRow<'a> {
    pub slot: TimeOfDay,
    pub cells: Vec<Cell<'a>>,
}

pub struct ProgramGrid<'a> {
    pub rooms: &'static [Room],
    pub rows: Vec<GridRow<'a>>,
}

/// Full grid over the display window. Fails when the activity list violates
/// the per-room disjointness preconditions.
pub fn build_grid(activities: &[Activity]) -> Result<ProgramGrid<'_>, ScheduleError> {
    validate_schedule(activities)?;
    let rows = build_time_slots(WINDOW_START, WINDOW_END, STEP_MINUTES)
        .into_iter()
        .map(|slot| GridRow {
            slot,
            cells: Room::ALL
                .iter()
                .map(|&room| cell_at(room, slot, activities))
                .collect(),
        })
        .collect();
    Ok(ProgramGrid {
        rooms: &Room::ALL,
        rows,
    })
}
