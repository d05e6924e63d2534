use serde_json::Value;
use tracing::warn;

use crate::error::ClientError;
use crate::models::Disertante;
use crate::services::api_client::ApiClient;

/// Speakers from `GET /api/disertantes/`. Records the API serves in a shape
/// we do not recognize are dropped with a warning rather than failing the
/// whole page.
pub async fn list_disertantes(api: &ApiClient) -> Result<Vec<Disertante>, ClientError> {
    let value = api.get_json("/api/disertantes/").await?;
    Ok(parse_list(value, "disertante"))
}

pub(crate) fn parse_list<T: serde::de::DeserializeOwned>(value: Value, kind: &str) -> Vec<T> {
    let items: Vec<Value> = match serde_json::from_value(value) {
        Ok(items) => items,
        Err(e) => {
            warn!("{} payload is not a list: {}", kind, e);
            return Vec::new();
        }
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("skipping unreadable {} record: {}", kind, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tolerates_partial_records() {
        let value = json!([
            { "nombre": "Ana Pérez", "tema_presentacion": "Última milla" },
            { "bio": "sin nombre" }
        ]);
        let speakers: Vec<Disertante> = parse_list(value, "disertante");
        assert_eq!(speakers.len(), 1);
        assert_eq!(speakers[0].nombre, "Ana Pérez");
        assert_eq!(speakers[0].tema_presentacion, "Última milla");
        assert!(speakers[0].bio.is_empty());
    }
}
