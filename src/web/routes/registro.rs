use askama::Template;
use axum::extract::State;
use axum::response::Html;
use axum::Form;

use crate::services::registro_service::{self, RegistroIndividualForm, PROFILE_TYPES};
use crate::web::routes::submit_notice;
use crate::web::AppState;

#[derive(Template)]
#[template(path = "registro.html")]
pub struct RegistroTemplate {
    pub profile_types: Vec<ProfileOption>,
    pub has_notice: bool,
    pub notice_ok: bool,
    pub notice: String,
}

pub struct ProfileOption {
    pub value: String,
    pub label: String,
}

fn profile_options() -> Vec<ProfileOption> {
    PROFILE_TYPES
        .iter()
        .map(|(value, label)| ProfileOption {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect()
}

pub async fn registro_page() -> Html<String> {
    let template = RegistroTemplate {
        profile_types: profile_options(),
        has_notice: false,
        notice_ok: false,
        notice: String::new(),
    };
    Html(template.render().unwrap())
}

pub async fn registro_submit(
    State(state): State<AppState>,
    Form(form): Form<RegistroIndividualForm>,
) -> Html<String> {
    let (notice_ok, notice) =
        submit_notice(registro_service::submit_individual(&state.api, &form).await);
    let template = RegistroTemplate {
        profile_types: profile_options(),
        has_notice: true,
        notice_ok,
        notice,
    };
    Html(template.render().unwrap())
}
