// src/main.rs

// --- Declaração dos Módulos ---
mod config;
mod error;
mod models;
mod services;
mod state;
mod store;
mod web;

// --- Imports ---
use crate::{config::Config, state::AppState, store::Store};
use axum::serve;
use std::{env, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuração do Logging (Tracing) ---
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                env::var("RUST_LOG")
                    .unwrap_or_else(|_| "gymp2=debug,tower_http=info,sqlx=warn".into())
                    .into()
            }),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando servidor Gymp2...");

    // --- Configuração e Armazenamento ---
    let config = Config::from_env();
    let store = match Store::inicializar(&config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("❌ Falha crítica ao inicializar o armazenamento: {}", e);
            return Err(anyhow::anyhow!("Falha ao preparar os dados: {}", e));
        }
    };

    // --- Criação do Estado da Aplicação ---
    let app_state = AppState {
        store: Arc::new(store),
        realtime: state::RealtimeState::default(),
    };

    // --- Configuração do Endereço e Listener ---
    let addr = SocketAddr::from(([0, 0, 0, 0], config.porta));
    tracing::info!("📡 Servidor escutando em http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Falha ao iniciar listener na porta {}: {}", config.porta, e);
            return Err(e.into());
        }
    };

    // --- Criação do Router e Aplicação das Camadas (Middlewares) ---
    tracing::info!("🛠️ Construindo router e aplicando middlewares...");
    let app = web::routes::criar_router(app_state, config.dir_publico.clone())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    tracing::info!("✅ Router e middlewares configurados.");

    // --- Início do Servidor ---
    tracing::info!("👂 Servidor pronto para aceitar conexões...");
    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}
