use crate::error::ClientError;
use crate::models::Empresa;
use crate::services::api_client::ApiClient;
use crate::services::disertantes_service::parse_list;

/// Companies from `GET /api/empresas/`, used for the companies page and the
/// sponsor logo strip.
pub async fn list_empresas(api: &ApiClient) -> Result<Vec<Empresa>, ClientError> {
    let value = api.get_json("/api/empresas/").await?;
    Ok(parse_list(value, "empresa"))
}
