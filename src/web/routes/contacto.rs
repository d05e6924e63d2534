use askama::Template;
use axum::response::Html;

#[derive(Template)]
#[template(path = "contacto.html")]
pub struct ContactoTemplate;

pub async fn contacto_handler() -> Html<String> {
    let template = ContactoTemplate;
    Html(template.render().unwrap())
}
