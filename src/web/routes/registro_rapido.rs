use askama::Template;
use axum::extract::State;
use axum::response::Html;
use axum::Form;

use crate::services::registro_service::{self, RegistroRapidoForm};
use crate::web::routes::submit_notice;
use crate::web::AppState;

#[derive(Template)]
#[template(path = "registro_rapido.html")]
pub struct RegistroRapidoTemplate {
    pub has_notice: bool,
    pub notice_ok: bool,
    pub notice: String,
}

pub async fn registro_rapido_page() -> Html<String> {
    let template = RegistroRapidoTemplate {
        has_notice: false,
        notice_ok: false,
        notice: String::new(),
    };
    Html(template.render().unwrap())
}

pub async fn registro_rapido_submit(
    State(state): State<AppState>,
    Form(form): Form<RegistroRapidoForm>,
) -> Html<String> {
    let (notice_ok, notice) =
        submit_notice(registro_service::submit_rapido(&state.api, &form).await);
    let template = RegistroRapidoTemplate {
        has_notice: true,
        notice_ok,
        notice,
    };
    Html(template.render().unwrap())
}
