//! Form validation and submission flows. Validation failures stay local;
//! the network is never touched for a form we already know is wrong.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ClientError;
use crate::models::checkin::looks_like_email;
use crate::models::CheckinPayload;
use crate::services::api_client::{
    is_csrf_rejection, parse_json_response, ApiClient, FormField, PostBody,
};

/// What a form page shows after a submit.
pub struct SubmitOutcome {
    pub ok: bool,
    pub message: String,
}

pub const PROFILE_TYPES: [(&str, &str); 5] = [
    ("VISITOR", "Visitante"),
    ("STUDENT", "Estudiante"),
    ("TEACHER", "Docente"),
    ("PROFESSIONAL", "Profesional"),
    ("PRESS", "Prensa"),
];

const TIPOS_INSCRIPCION: [&str; 3] = ["INDIVIDUAL", "EMPRESA", "GRUPO"];

// ---------------------------------------------------------------------------
// Field validation

fn require(value: &str, label: &str) -> Result<String, ClientError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::Validation(format!("{label} es obligatorio")));
    }
    Ok(value.to_string())
}

fn valid_email(value: &str) -> Result<String, ClientError> {
    let value = value.trim();
    if !looks_like_email(value) {
        return Err(ClientError::Validation(
            "el email no tiene un formato válido".to_string(),
        ));
    }
    Ok(value.to_string())
}

fn valid_dni(value: &str) -> Result<String, ClientError> {
    let value = value.trim();
    if !(7..=8).contains(&value.len()) || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::Validation(
            "el DNI debe tener 7 u 8 dígitos".to_string(),
        ));
    }
    Ok(value.to_string())
}

// ---------------------------------------------------------------------------
// Shared submit path

async fn submit(api: &ApiClient, path: &str, body: PostBody) -> Result<SubmitOutcome, ClientError> {
    let resp = api.post_with_token(path, &body).await?;
    if is_csrf_rejection(&resp) {
        // Already retried once inside the client.
        return Err(ClientError::CsrfRejected);
    }
    let value = parse_json_response(&resp)?;
    Ok(outcome_from(resp.is_success(), &value))
}

/// Maps the API's reply shapes (`{message}`, `{status, message}`,
/// `{error, missing_fields?}`, `{ok}`) onto one notice.
fn outcome_from(ok: bool, body: &Value) -> SubmitOutcome {
    if ok {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "Registro recibido correctamente.".to_string());
        return SubmitOutcome { ok: true, message };
    }

    let mut message = body
        .get("error")
        .or_else(|| body.get("message"))
        .or_else(|| body.get("detail"))
        .and_then(Value::as_str)
        .unwrap_or("No se pudo completar la operación.")
        .to_string();
    if let Some(fields) = body.get("missing_fields").and_then(Value::as_array) {
        let names: Vec<&str> = fields.iter().filter_map(Value::as_str).collect();
        if !names.is_empty() {
            message = format!("{message} Campos faltantes: {}.", names.join(", "));
        }
    }
    SubmitOutcome { ok: false, message }
}

// ---------------------------------------------------------------------------
// Individual registration

#[derive(Debug, Deserialize, Default)]
pub struct RegistroIndividualForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub dni: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub profile_type: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub occupation: String,
}

pub async fn submit_individual(
    api: &ApiClient,
    form: &RegistroIndividualForm,
) -> Result<SubmitOutcome, ClientError> {
    let profile_type = require(&form.profile_type, "el tipo de participante")?;
    if !PROFILE_TYPES.iter().any(|(v, _)| *v == profile_type) {
        return Err(ClientError::Validation(
            "tipo de participante desconocido".to_string(),
        ));
    }

    let mut asistente = json!({
        "first_name": require(&form.first_name, "el nombre")?,
        "last_name": require(&form.last_name, "el apellido")?,
        "dni": valid_dni(&form.dni)?,
        "email": valid_email(&form.email)?,
        "phone": form.phone.trim(),
        "profile_type": profile_type,
    });
    for (key, value) in [
        ("institution", form.institution.trim()),
        ("occupation", form.occupation.trim()),
    ] {
        if !value.is_empty() {
            asistente[key] = json!(value);
        }
    }

    submit(
        api,
        "/api/inscripcion/",
        PostBody::Json(json!({ "asistente": asistente })),
    )
    .await
}

// ---------------------------------------------------------------------------
// Group registration

#[derive(Debug, Deserialize, Default)]
pub struct RegistroGrupalForm {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    /// One attendee per line: `nombre, apellido, email`.
    #[serde(default)]
    pub integrantes: String,
}

pub async fn submit_grupal(
    api: &ApiClient,
    form: &RegistroGrupalForm,
) -> Result<SubmitOutcome, ClientError> {
    let company = json!({
        "name": require(&form.company_name, "el nombre de la empresa")?,
        "contact_email": valid_email(&form.contact_email)?,
        "contact_phone": form.contact_phone.trim(),
    });

    let mut attendees = Vec::new();
    for (i, line) in form
        .integrantes
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
    {
        let mut parts = line.split(',').map(str::trim);
        let (first, last, email) = match (parts.next(), parts.next(), parts.next()) {
            (Some(f), Some(l), Some(e)) if !f.is_empty() && !l.is_empty() => (f, l, e),
            _ => {
                return Err(ClientError::Validation(format!(
                    "integrante {}: use el formato `nombre, apellido, email`",
                    i + 1
                )))
            }
        };
        attendees.push(json!({
            "first_name": first,
            "last_name": last,
            "email": valid_email(email).map_err(|_| {
                ClientError::Validation(format!("integrante {}: email inválido", i + 1))
            })?,
        }));
    }
    if attendees.is_empty() {
        return Err(ClientError::Validation(
            "agregue al menos un integrante".to_string(),
        ));
    }

    submit(
        api,
        "/api/inscripcion-grupal/",
        PostBody::Json(json!({ "company": company, "attendees": attendees })),
    )
    .await
}

// ---------------------------------------------------------------------------
// Company registration (multipart, includes the logo file)

#[derive(Debug, Default)]
pub struct RegistroEmpresaForm {
    pub nombre_empresa: String,
    pub email_contacto: String,
    pub telefono: String,
    pub sitio_web: String,
    pub descripcion: String,
    pub tipos_participacion: Vec<String>,
    pub logo: Option<LogoUpload>,
}

#[derive(Debug)]
pub struct LogoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub async fn submit_empresa(
    api: &ApiClient,
    form: &RegistroEmpresaForm,
) -> Result<SubmitOutcome, ClientError> {
    let mut fields = vec![
        FormField::Text {
            name: "nombre_empresa".to_string(),
            value: require(&form.nombre_empresa, "el nombre de la empresa")?,
        },
        FormField::Text {
            name: "email_contacto".to_string(),
            value: valid_email(&form.email_contacto)?,
        },
        FormField::Text {
            name: "telefono".to_string(),
            value: form.telefono.trim().to_string(),
        },
        FormField::Text {
            name: "sitio_web".to_string(),
            value: form.sitio_web.trim().to_string(),
        },
        FormField::Text {
            name: "descripcion".to_string(),
            value: form.descripcion.trim().to_string(),
        },
        FormField::Text {
            name: "tipos_participacion".to_string(),
            value: form.tipos_participacion.join(","),
        },
    ];
    if let Some(logo) = &form.logo {
        fields.push(FormField::File {
            name: "logo".to_string(),
            file_name: logo.file_name.clone(),
            content_type: logo.content_type.clone(),
            bytes: logo.bytes.clone(),
        });
    }

    submit(api, "/api/registro-empresas/", PostBody::Multipart(fields)).await
}

// ---------------------------------------------------------------------------
// Quick on-site registration

#[derive(Debug, Deserialize, Default)]
pub struct RegistroRapidoForm {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tipo_inscripcion: String,
    #[serde(default)]
    pub empresa: String,
    #[serde(default)]
    pub nombre_grupo: String,
}

pub async fn submit_rapido(
    api: &ApiClient,
    form: &RegistroRapidoForm,
) -> Result<SubmitOutcome, ClientError> {
    let tipo = require(&form.tipo_inscripcion, "el tipo de inscripción")?;
    if !TIPOS_INSCRIPCION.contains(&tipo.as_str()) {
        return Err(ClientError::Validation(
            "tipo de inscripción desconocido".to_string(),
        ));
    }
    let empresa = form.empresa.trim();
    if tipo == "EMPRESA" && empresa.is_empty() {
        return Err(ClientError::Validation(
            "indique el nombre de la empresa".to_string(),
        ));
    }
    let nombre_grupo = form.nombre_grupo.trim();
    if tipo == "GRUPO" && nombre_grupo.is_empty() {
        return Err(ClientError::Validation(
            "indique el nombre del grupo".to_string(),
        ));
    }

    let payload = json!({
        "tipo_inscripcion": tipo,
        "asistente": {
            "nombre": require(&form.nombre, "el nombre")?,
            "email": valid_email(&form.email)?,
        },
        "empresa": if empresa.is_empty() { Value::Null } else { json!(empresa) },
        "nombre_grupo": nombre_grupo,
    });

    submit(api, "/api/registro-rapido/", PostBody::Json(payload)).await
}

// ---------------------------------------------------------------------------
// DNI verification

#[derive(Debug, Deserialize, Default)]
pub struct VerificarDniForm {
    #[serde(default)]
    pub dni: String,
}

pub struct AsistenteView {
    pub nombre_completo: String,
    pub email: String,
    pub dni: String,
}

pub struct VerificacionOutcome {
    pub ok: bool,
    pub message: String,
    pub asistente: Option<AsistenteView>,
}

pub async fn verificar_dni(
    api: &ApiClient,
    form: &VerificarDniForm,
) -> Result<VerificacionOutcome, ClientError> {
    let dni = valid_dni(&form.dni)?;
    let resp = api
        .post_with_token("/api/verificar-dni/", &PostBody::Json(json!({ "dni": dni })))
        .await?;
    if is_csrf_rejection(&resp) {
        return Err(ClientError::CsrfRejected);
    }
    if resp.status.as_u16() == 404 {
        return Ok(VerificacionOutcome {
            ok: false,
            message: "No encontramos una inscripción con ese DNI.".to_string(),
            asistente: None,
        });
    }

    let value = parse_json_response(&resp)?;
    let Some(asistente) = value.get("asistente") else {
        let outcome = outcome_from(resp.is_success(), &value);
        return Ok(VerificacionOutcome {
            ok: false,
            message: outcome.message,
            asistente: None,
        });
    };

    let str_field = |key: &str| {
        asistente
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Ok(VerificacionOutcome {
        ok: true,
        message: "Inscripción verificada. El certificado fue enviado por email.".to_string(),
        asistente: Some(AsistenteView {
            nombre_completo: str_field("nombre_completo"),
            email: str_field("email"),
            dni: str_field("dni"),
        }),
    })
}

// ---------------------------------------------------------------------------
// QR check-in

#[derive(Debug, Deserialize, Default)]
pub struct CheckinForm {
    #[serde(default)]
    pub codigo: String,
}

pub struct CheckinOutcome {
    pub ok: bool,
    pub message: String,
    pub certificate_id: Option<String>,
}

pub async fn registrar_asistencia(
    api: &ApiClient,
    form: &CheckinForm,
) -> Result<CheckinOutcome, ClientError> {
    let Some(payload) = CheckinPayload::parse(&form.codigo) else {
        return Err(ClientError::Validation(
            "ingrese un email o un número de asistente válido".to_string(),
        ));
    };

    let resp = api
        .post_with_token("/api/registrar-asistencia/", &PostBody::Json(payload.to_json()))
        .await?;
    if is_csrf_rejection(&resp) {
        return Err(ClientError::CsrfRejected);
    }
    let value = parse_json_response(&resp)?;
    let outcome = outcome_from(resp.is_success(), &value);

    let certificate_id = value
        .get("certificate_id")
        .filter(|v| !v.is_null())
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    if certificate_id.is_none() && outcome.ok {
        warn!("check-in accepted without a certificate id");
    }

    Ok(CheckinOutcome {
        ok: outcome.ok,
        message: outcome.message,
        certificate_id,
    })
}

// ---------------------------------------------------------------------------
// Static QR poster

pub struct QrView {
    pub url: String,
    pub image_base64: String,
    pub description: String,
}

pub async fn load_checkin_qr(api: &ApiClient) -> Result<QrView, ClientError> {
    let value = api.get_json("/api/generar-qrs/").await?;
    let qr = value
        .get("checkin_qr")
        .ok_or_else(|| ClientError::Api("la respuesta no trae checkin_qr".to_string()))?;
    let str_field = |key: &str| {
        qr.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Ok(QrView {
        url: str_field("url"),
        image_base64: str_field("image_base64"),
        description: str_field("description"),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn dni_validation_matches_the_document_format() {
        assert!(valid_dni("12345678").is_ok());
        assert!(valid_dni("1234567").is_ok());
        assert!(valid_dni("123456").is_err());
        assert!(valid_dni("123456789").is_err());
        assert!(valid_dni("12a45678").is_err());
    }

    #[test]
    fn outcome_prefers_message_then_status_fallback() {
        let ok = outcome_from(true, &json!({ "message": "Inscripción registrada" }));
        assert!(ok.ok);
        assert_eq!(ok.message, "Inscripción registrada");

        let bare = outcome_from(true, &json!({ "status": "success" }));
        assert!(bare.ok);
        assert!(!bare.message.is_empty());
    }

    #[test]
    fn outcome_appends_missing_fields() {
        let out = outcome_from(
            false,
            &json!({ "error": "Faltan datos.", "missing_fields": ["dni", "email"] }),
        );
        assert!(!out.ok);
        assert_eq!(out.message, "Faltan datos. Campos faltantes: dni, email.");
    }

    #[tokio::test]
    async fn validation_failures_never_touch_the_network() {
        // Unroutable base: any network call would error, a validation error
        // must win before that.
        let config = crate::config::AppConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            token_cookie: "csrftoken".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let api = ApiClient::new(&config).unwrap();

        let form = RegistroIndividualForm {
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            dni: "no-es-dni".to_string(),
            email: "ana@example.com".to_string(),
            profile_type: "VISITOR".to_string(),
            ..Default::default()
        };
        match submit_individual(&api, &form).await {
            Err(ClientError::Validation(msg)) => assert!(msg.contains("DNI")),
            other => panic!("expected a validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn rapido_requires_the_conditional_names() {
        let config = crate::config::AppConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            token_cookie: "csrftoken".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let api = ApiClient::new(&config).unwrap();

        let form = RegistroRapidoForm {
            nombre: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            tipo_inscripcion: "EMPRESA".to_string(),
            ..Default::default()
        };
        let result = submit_rapido(&api, &form).await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }
}
