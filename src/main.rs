use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, get_service},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

use congreso::config::AppConfig;
use congreso::services::api_client::ApiClient;
use congreso::web::routes::{
    checkin, contacto, disertantes, empresas, historia, home, programa, qrs, registro,
    registro_empresas, registro_grupal, registro_rapido, verificar_dni,
};
use congreso::web::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt::init();
    info!("congreso build {}", env!("CONGRESO_BUILD_ID"));

    // 2. Configuration and the shared API client
    let config = AppConfig::from_env();
    println!("API del congreso: {}", config.api_base);

    let api = match ApiClient::new(&config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            eprintln!("⚠️  Configuración inválida: {}", e);
            std::process::exit(1);
        }
    };
    let state = AppState {
        config: config.clone(),
        api,
    };

    // 3. Build the application
    let app = Router::new()
        // Informational pages
        .route("/", get(home::index_handler))
        .route("/programa", get(programa::programa_handler))
        .route("/disertantes", get(disertantes::disertantes_handler))
        .route("/empresas", get(empresas::empresas_handler))
        .route("/historia", get(historia::historia_handler))
        .route("/contacto", get(contacto::contacto_handler))
        // Registration and accreditation
        .route(
            "/registro",
            get(registro::registro_page).post(registro::registro_submit),
        )
        .route(
            "/registro-grupal",
            get(registro_grupal::registro_grupal_page).post(registro_grupal::registro_grupal_submit),
        )
        .route(
            "/registro-empresas",
            get(registro_empresas::registro_empresas_page)
                .post(registro_empresas::registro_empresas_submit),
        )
        .route(
            "/registro-rapido",
            get(registro_rapido::registro_rapido_page).post(registro_rapido::registro_rapido_submit),
        )
        .route(
            "/verificar-dni",
            get(verificar_dni::verificar_dni_page).post(verificar_dni::verificar_dni_submit),
        )
        .route(
            "/checkin",
            get(checkin::checkin_page).post(checkin::checkin_submit),
        )
        .route("/qrs", get(qrs::qrs_handler))
        // Static files
        .nest_service(
            "/assets",
            get_service(ServeDir::new("assets")).layer(SetResponseHeaderLayer::if_not_present(
                CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=300"),
            )),
        )
        // Layers
        .layer(CatchPanicLayer::new())
        // State
        .with_state(state);

    // 4. Start the server (with a fallback port)
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("⚠️  HOST/PORT inválidos: {}", e);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!(
                "⚠️  No se pudo escuchar en {}: {}. Probando {}:{}",
                addr,
                e,
                config.host,
                config.port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", config.host, config.port + 1)
                .parse()
                .expect("fallback address");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("no free port for the fallback either")
        }
    };

    let bound_addr = listener.local_addr().unwrap();
    println!("🚀 Sitio del congreso en http://{}", bound_addr);

    axum::serve(listener, app).await.unwrap();
}
