use askama::Template;
use axum::extract::State;
use axum::response::Html;
use axum::Form;

use crate::services::registro_service::{self, RegistroGrupalForm};
use crate::web::routes::submit_notice;
use crate::web::AppState;

#[derive(Template)]
#[template(path = "registro_grupal.html")]
pub struct RegistroGrupalTemplate {
    pub has_notice: bool,
    pub notice_ok: bool,
    pub notice: String,
}

pub async fn registro_grupal_page() -> Html<String> {
    let template = RegistroGrupalTemplate {
        has_notice: false,
        notice_ok: false,
        notice: String::new(),
    };
    Html(template.render().unwrap())
}

pub async fn registro_grupal_submit(
    State(state): State<AppState>,
    Form(form): Form<RegistroGrupalForm>,
) -> Html<String> {
    let (notice_ok, notice) =
        submit_notice(registro_service::submit_grupal(&state.api, &form).await);
    let template = RegistroGrupalTemplate {
        has_notice: true,
        notice_ok,
        notice,
    };
    Html(template.render().unwrap())
}
