use askama::Template;
use axum::extract::State;
use axum::response::Html;
use axum::Form;
use tracing::warn;

use crate::error::ClientError;
use crate::services::registro_service::{self, CheckinForm};
use crate::web::AppState;

#[derive(Template)]
#[template(path = "checkin.html")]
pub struct CheckinTemplate {
    pub has_notice: bool,
    pub notice_ok: bool,
    pub notice: String,
    pub certificate_id: String,
}

impl CheckinTemplate {
    fn blank() -> Self {
        Self {
            has_notice: false,
            notice_ok: false,
            notice: String::new(),
            certificate_id: String::new(),
        }
    }
}

pub async fn checkin_page() -> Html<String> {
    Html(CheckinTemplate::blank().render().unwrap())
}

pub async fn checkin_submit(
    State(state): State<AppState>,
    Form(form): Form<CheckinForm>,
) -> Html<String> {
    let mut template = CheckinTemplate::blank();
    template.has_notice = true;

    match registro_service::registrar_asistencia(&state.api, &form).await {
        Ok(outcome) => {
            template.notice_ok = outcome.ok;
            template.notice = outcome.message;
            template.certificate_id = outcome.certificate_id.unwrap_or_default();
        }
        Err(ClientError::Validation(message)) => template.notice = message,
        Err(e) => {
            warn!("check-in failed: {}", e);
            template.notice =
                "No se pudo registrar la asistencia. Probá de nuevo o acercate a acreditación."
                    .to_string();
        }
    }

    Html(template.render().unwrap())
}
