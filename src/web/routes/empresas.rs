use askama::Template;
use axum::extract::State;
use axum::response::Html;
use tracing::warn;

use crate::models::Empresa;
use crate::services::empresas_service;
use crate::web::AppState;

#[derive(Template)]
#[template(path = "empresas.html")]
pub struct EmpresasTemplate {
    pub available: bool,
    pub empresas: Vec<Empresa>,
}

pub async fn empresas_handler(State(state): State<AppState>) -> Html<String> {
    let template = match empresas_service::list_empresas(&state.api).await {
        Ok(empresas) => EmpresasTemplate {
            available: true,
            empresas,
        },
        Err(e) => {
            warn!("companies page unavailable: {}", e);
            EmpresasTemplate {
                available: false,
                empresas: Vec::new(),
            }
        }
    };
    Html(template.render().unwrap())
}
