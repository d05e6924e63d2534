use serde::Deserialize;

/// Speaker record from `GET /api/disertantes/`.
#[derive(Debug, Clone, Deserialize)]
pub struct Disertante {
    pub nombre: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub foto_url: String,
    #[serde(default)]
    pub tema_presentacion: String,
}
