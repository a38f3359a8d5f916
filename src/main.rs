//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

#[cfg(test)]
mod test_support;

use crate::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG, padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let listen_addr = config.listen_addr.clone();
    let sweep_interval = config.sweep_interval;

    let app_state = AppState::new(config).await?;

    // Limpeza periódica dos OTPs vencidos
    let sweeper = app_state.registration_service.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = sweeper.purge_expired_verifications().await {
                tracing::error!("Falha ao limpar verificações expiradas: {:?}", e);
            }
        }
    });

    let app = routes::app(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&listen_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Swagger UI em /swagger-ui");
    axum::serve(listener, app).await?;

    Ok(())
}
