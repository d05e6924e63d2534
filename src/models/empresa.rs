use serde::Deserialize;

/// Company record from `GET /api/empresas/`.
#[derive(Debug, Clone, Deserialize)]
pub struct Empresa {
    pub nombre_empresa: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub sitio_web: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
}
