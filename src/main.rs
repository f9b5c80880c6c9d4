use usecase_portal::modules;
use usecase_portal::proxy;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = modules::logger::init_logger();

    let mut portal_config = match modules::config::load_portal_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!("failed to load portal config: {}. using defaults", err);
            let cfg = proxy::PortalConfig::default();
            let _ = modules::config::save_portal_config(&cfg);
            cfg
        }
    };

    let bind = modules::config::apply_env_overrides(&mut portal_config, |key| std::env::var(key).ok());

    if portal_config.auth.shared_secret == proxy::config::DEFAULT_SHARED_SECRET {
        tracing::warn!("using the default shared token; set USECASE_PORTAL_TOKEN to change it");
    }

    tracing::info!(
        "forwarding to {} (environment: {:?})",
        portal_config.upstream.base_url,
        portal_config.environment
    );

    let (server, handle) = proxy::AxumServer::start(bind.host.clone(), bind.port, &portal_config)
        .await
        .map_err(|e| format!("failed to start portal server: {}", e))?;

    tracing::info!("usecase-portal listening on http://{}", server.local_addr());

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {}", e))?;

    tracing::info!("shutdown requested, stopping server...");
    server.stop();
    let _ = handle.await;

    Ok(())
}
