use askama::Template;
use axum::extract::State;
use axum::response::Html;
use tracing::warn;

use crate::services::registro_service;
use crate::web::AppState;

#[derive(Template)]
#[template(path = "qrs.html")]
pub struct QrsTemplate {
    pub available: bool,
    pub url: String,
    pub image_base64: String,
    pub description: String,
}

/// Printable poster with the check-in QR for the accreditation desk.
pub async fn qrs_handler(State(state): State<AppState>) -> Html<String> {
    let template = match registro_service::load_checkin_qr(&state.api).await {
        Ok(qr) => QrsTemplate {
            available: true,
            url: qr.url,
            image_base64: qr.image_base64,
            description: qr.description,
        },
        Err(e) => {
            warn!("QR poster unavailable: {}", e);
            QrsTemplate {
                available: false,
                url: String::new(),
                image_base64: String::new(),
                description: String::new(),
            }
        }
    };
    Html(template.render().unwrap())
}
