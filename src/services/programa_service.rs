//! View assembly for the program page: fetch, parse, validate, lay out.

use serde_json::Value;
use tracing::warn;

use crate::error::ClientError;
use crate::models::{Activity, Category, ProgramaItemWire, Room};
use crate::schedule::{self, Cell, ProgramFilter};
use crate::services::api_client::ApiClient;

/// One `<td>` worth of grid state, flattened for the template. `Covered`
/// cells are skipped entirely when rendering (`skip == true`); the card that
/// covers them already claimed the rows via `rowspan`.
pub struct GridCellView {
    pub is_start: bool,
    pub skip: bool,
    pub row_span: u32,
    /// False when the activity exists but the active filter hides it; the
    /// cell then renders as a muted placeholder of the same size so the
    /// grid never shifts.
    pub visible: bool,
    pub title: String,
    pub speaker: String,
    pub time_label: String,
    pub description: String,
    pub category_label: String,
    pub category_slug: String,
}

pub struct GridRowView {
    pub slot: String,
    pub cells: Vec<GridCellView>,
}

pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub struct ProgramaPageView {
    pub room_headers: Vec<String>,
    pub rows: Vec<GridRowView>,
    pub category_options: Vec<FilterOption>,
    pub room_options: Vec<FilterOption>,
    pub has_activities: bool,
}

pub async fn load_programa_page(
    api: &ApiClient,
    filter: &ProgramFilter,
) -> Result<ProgramaPageView, ClientError> {
    let value = api.get_json("/api/programa/").await?;
    let activities = parse_activities(value);

    let grid = schedule::build_grid(&activities)
        .map_err(|e| ClientError::Api(format!("programa inconsistente: {e}")))?;
    let visible = schedule::select_visible(&activities, filter);

    let rows = grid
        .rows
        .iter()
        .map(|row| GridRowView {
            slot: row.slot.to_string(),
            cells: row
                .cells
                .iter()
                .map(|cell| cell_view(cell, &visible))
                .collect(),
        })
        .collect();

    Ok(ProgramaPageView {
        room_headers: grid.rooms.iter().map(|r| r.label().to_string()).collect(),
        rows,
        category_options: category_options(filter),
        room_options: room_options(filter),
        has_activities: !activities.is_empty(),
    })
}

/// Wire records that do not parse are dropped with a warning; the page
/// renders the valid remainder. Schedule-level conflicts, by contrast, fail
/// the whole grid upstream of here.
fn parse_activities(value: Value) -> Vec<Activity> {
    let items: Vec<Value> = match serde_json::from_value(value) {
        Ok(items) => items,
        Err(e) => {
            warn!("programa payload is not a list: {}", e);
            return Vec::new();
        }
    };

    let mut activities = Vec::new();
    for item in items {
        let wire: ProgramaItemWire = match serde_json::from_value(item) {
            Ok(wire) => wire,
            Err(e) => {
                warn!("skipping unreadable program record: {}", e);
                continue;
            }
        };
        match Activity::from_wire(wire) {
            Ok(activity) => activities.push(activity),
            Err(e) => warn!("skipping invalid program record: {}", e),
        }
    }
    activities
}

fn cell_view(cell: &Cell<'_>, visible: &[&Activity]) -> GridCellView {
    match cell {
        Cell::Start { activity, row_span } => GridCellView {
            is_start: true,
            skip: false,
            row_span: *row_span,
            visible: visible.iter().any(|v| *v == *activity),
            title: activity.title.clone(),
            speaker: activity.speaker_name.clone().unwrap_or_default(),
            time_label: format!("{} – {}", activity.start, activity.end),
            description: activity.description.clone(),
            category_label: activity.category.label().to_string(),
            category_slug: activity.category.slug().to_string(),
        },
        Cell::Covered => GridCellView {
            is_start: false,
            skip: true,
            row_span: 1,
            visible: false,
            title: String::new(),
            speaker: String::new(),
            time_label: String::new(),
            description: String::new(),
            category_label: String::new(),
            category_slug: String::new(),
        },
        Cell::Empty => GridCellView {
            is_start: false,
            skip: false,
            row_span: 1,
            visible: false,
            title: String::new(),
            speaker: String::new(),
            time_label: String::new(),
            description: String::new(),
            category_label: String::new(),
            category_slug: String::new(),
        },
    }
}

fn category_options(filter: &ProgramFilter) -> Vec<FilterOption> {
    let selected = filter.category();
    Category::ALL
        .into_iter()
        .map(|c| FilterOption {
            value: c.label().to_string(),
            label: c.label().to_string(),
            selected: selected == Some(c),
        })
        .collect()
}

fn room_options(filter: &ProgramFilter) -> Vec<FilterOption> {
    let selected = filter.room();
    Room::ALL
        .into_iter()
        .map(|r| FilterOption {
            value: r.label().to_string(),
            label: r.label().to_string(),
            selected: selected == Some(r),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unparseable_records_are_dropped_not_fatal() {
        let value = json!([
            {
                "titulo": "Logística urbana",
                "hora_inicio": "11:00:00",
                "hora_fin": "12:30:00",
                "sala": "Aula 1",
                "categoria": "LOGÍSTICA",
                "descripcion": ""
            },
            { "titulo": "Sin horario", "sala": "Aula 2" },
            "no soy un objeto"
        ]);
        let activities = parse_activities(value);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].title, "Logística urbana");
    }

    #[test]
    fn filtered_out_start_keeps_its_span_but_not_its_card() {
        let activities = parse_activities(json!([
            {
                "titulo": "Logística urbana",
                "hora_inicio": "10:00:00",
                "hora_fin": "11:00:00",
                "sala": "Aula 1",
                "categoria": "LOGÍSTICA"
            }
        ]));
        let grid = schedule::build_grid(&activities).unwrap();
        let filter = ProgramFilter {
            categoria: Some("TRANSPORTE".to_string()),
            sala: None,
        };
        let visible = schedule::select_visible(&activities, &filter);

        // Aula 1 is the second column; 10:00 is the first row.
        let start = cell_view(&grid.rows[0].cells[1], &visible);
        assert!(start.is_start);
        assert_eq!(start.row_span, 2);
        assert!(!start.visible);

        // The covered 10:30 row still skips its cell.
        let covered = cell_view(&grid.rows[1].cells[1], &visible);
        assert!(covered.skip);
    }
}
