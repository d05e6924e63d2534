pub mod checkin;
pub mod contacto;
pub mod disertantes;
pub mod empresas;
pub mod historia;
pub mod home;
pub mod programa;
pub mod qrs;
pub mod registro;
pub mod registro_empresas;
pub mod registro_grupal;
pub mod registro_rapido;
pub mod verificar_dni;

use tracing::warn;

use crate::error::ClientError;
use crate::services::registro_service::SubmitOutcome;

/// Collapses a submit result into the `(ok, message)` pair the form
/// templates render as their notice banner.
pub(crate) fn submit_notice(result: Result<SubmitOutcome, ClientError>) -> (bool, String) {
    match result {
        Ok(outcome) => (outcome.ok, outcome.message),
        Err(ClientError::Validation(message)) => (false, message),
        Err(ClientError::CsrfRejected) => (
            false,
            "No pudimos validar el envío. Recargá la página e intentá de nuevo.".to_string(),
        ),
        Err(e) => {
            warn!("submission failed: {}", e);
            (
                false,
                "No se pudo conectar con el servidor de inscripciones. Intentá de nuevo en unos minutos.".to_string(),
            )
        }
    }
}
