pub mod api_client;
pub mod disertantes_service;
pub mod empresas_service;
pub mod programa_service;
pub mod registro_service;
