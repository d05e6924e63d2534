use askama::Template;
use axum::extract::{Multipart, State};
use axum::response::Html;
use tracing::warn;

use crate::services::registro_service::{self, LogoUpload, RegistroEmpresaForm};
use crate::web::routes::submit_notice;
use crate::web::AppState;

#[derive(Template)]
#[template(path = "registro_empresas.html")]
pub struct RegistroEmpresasTemplate {
    pub has_notice: bool,
    pub notice_ok: bool,
    pub notice: String,
}

pub async fn registro_empresas_page() -> Html<String> {
    let template = RegistroEmpresasTemplate {
        has_notice: false,
        notice_ok: false,
        notice: String::new(),
    };
    Html(template.render().unwrap())
}

pub async fn registro_empresas_submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Html<String> {
    let form = read_form(multipart).await;
    let (notice_ok, notice) =
        submit_notice(registro_service::submit_empresa(&state.api, &form).await);
    let template = RegistroEmpresasTemplate {
        has_notice: true,
        notice_ok,
        notice,
    };
    Html(template.render().unwrap())
}

/// The logo needs the raw bytes, so the whole form arrives as multipart.
/// Unreadable parts are skipped; missing required fields fail validation in
/// the service like on any other form.
async fn read_form(mut multipart: Multipart) -> RegistroEmpresaForm {
    let mut form = RegistroEmpresaForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("unreadable multipart field: {}", e);
                break;
            }
        };
        let name = field.name().unwrap_or_default().to_string();

        if name == "logo" {
            let file_name = field.file_name().unwrap_or("logo").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            match field.bytes().await {
                Ok(bytes) if !bytes.is_empty() => {
                    form.logo = Some(LogoUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                Ok(_) => {}
                Err(e) => warn!("logo upload failed mid-read: {}", e),
            }
            continue;
        }

        let value = field.text().await.unwrap_or_default();
        match name.as_str() {
            "nombre_empresa" => form.nombre_empresa = value,
            "email_contacto" => form.email_contacto = value,
            "telefono" => form.telefono = value,
            "sitio_web" => form.sitio_web = value,
            "descripcion" => form.descripcion = value,
            "tipos_participacion" => form.tipos_participacion.push(value),
            other => warn!("ignoring unknown form field `{}`", other),
        }
    }

    form
}
