use askama::Template;
use axum::extract::State;
use axum::response::Html;
use axum::Form;
use tracing::warn;

use crate::error::ClientError;
use crate::services::registro_service::{self, VerificarDniForm};
use crate::web::AppState;

#[derive(Template)]
#[template(path = "verificar_dni.html")]
pub struct VerificarDniTemplate {
    pub has_notice: bool,
    pub notice_ok: bool,
    pub notice: String,
    pub confirmed: bool,
    pub nombre_completo: String,
    pub email: String,
    pub dni: String,
}

impl VerificarDniTemplate {
    fn blank() -> Self {
        Self {
            has_notice: false,
            notice_ok: false,
            notice: String::new(),
            confirmed: false,
            nombre_completo: String::new(),
            email: String::new(),
            dni: String::new(),
        }
    }
}

pub async fn verificar_dni_page() -> Html<String> {
    Html(VerificarDniTemplate::blank().render().unwrap())
}

pub async fn verificar_dni_submit(
    State(state): State<AppState>,
    Form(form): Form<VerificarDniForm>,
) -> Html<String> {
    let mut template = VerificarDniTemplate::blank();
    template.has_notice = true;

    match registro_service::verificar_dni(&state.api, &form).await {
        Ok(outcome) => {
            template.notice_ok = outcome.ok;
            template.notice = outcome.message;
            if let Some(asistente) = outcome.asistente {
                template.confirmed = true;
                template.nombre_completo = asistente.nombre_completo;
                template.email = asistente.email;
                template.dni = asistente.dni;
            }
        }
        Err(ClientError::Validation(message)) => template.notice = message,
        Err(e) => {
            warn!("DNI verification failed: {}", e);
            template.notice =
                "No se pudo verificar el DNI en este momento. Intentá de nuevo.".to_string();
        }
    }

    Html(template.render().unwrap())
}
