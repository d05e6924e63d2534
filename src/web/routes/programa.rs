use askama::Template;
use axum::extract::{Query, State};
use axum::response::Html;
use tracing::warn;

use crate::schedule::ProgramFilter;
use crate::services::programa_service::{self, FilterOption, GridRowView};
use crate::web::AppState;

#[derive(Template)]
#[template(path = "programa.html")]
pub struct ProgramaTemplate {
    pub available: bool,
    pub error_message: String,
    pub has_activities: bool,
    pub room_headers: Vec<String>,
    pub rows: Vec<GridRowView>,
    pub category_options: Vec<FilterOption>,
    pub room_options: Vec<FilterOption>,
}

pub async fn programa_handler(
    State(state): State<AppState>,
    Query(filter): Query<ProgramFilter>,
) -> Html<String> {
    let template = match programa_service::load_programa_page(&state.api, &filter).await {
        Ok(page) => ProgramaTemplate {
            available: true,
            error_message: String::new(),
            has_activities: page.has_activities,
            room_headers: page.room_headers,
            rows: page.rows,
            category_options: page.category_options,
            room_options: page.room_options,
        },
        Err(e) => {
            warn!("program page unavailable: {}", e);
            ProgramaTemplate {
                available: false,
                error_message:
                    "No pudimos cargar el programa. Volvé a intentarlo en unos minutos."
                        .to_string(),
                has_activities: false,
                room_headers: Vec::new(),
                rows: Vec::new(),
                category_options: Vec::new(),
                room_options: Vec::new(),
            }
        }
    };

    Html(template.render().unwrap())
}
