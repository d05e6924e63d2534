use askama::Template;
use axum::extract::State;
use axum::response::Html;
use tracing::warn;

use crate::models::Disertante;
use crate::services::disertantes_service;
use crate::web::AppState;

#[derive(Template)]
#[template(path = "disertantes.html")]
pub struct DisertantesTemplate {
    pub available: bool,
    pub disertantes: Vec<Disertante>,
}

pub async fn disertantes_handler(State(state): State<AppState>) -> Html<String> {
    let template = match disertantes_service::list_disertantes(&state.api).await {
        Ok(disertantes) => DisertantesTemplate {
            available: true,
            disertantes,
        },
        Err(e) => {
            warn!("speakers page unavailable: {}", e);
            DisertantesTemplate {
                available: false,
                disertantes: Vec::new(),
            }
        }
    };
    Html(template.render().unwrap())
}
