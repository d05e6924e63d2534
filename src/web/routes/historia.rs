use askama::Template;
use axum::response::Html;

#[derive(Template)]
#[template(path = "historia.html")]
pub struct HistoriaTemplate;

pub async fn historia_handler() -> Html<String> {
    let template = HistoriaTemplate;
    Html(template.render().unwrap())
}
