// Broker service main entry point.
//
// Wires the durable store, the admin bootstrap, the connector set, the
// background queue processor, and the HTTP(S) listener together. Everything
// interesting lives in the library modules; this stays a thin composition
// root.
use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use broker::app::{build_router, AppState};
use broker::auth;
use broker::config::BrokerConfig;
use broker::connectors::{ApnsConnector, FcmConnector, MockConnector, WebhookConnector};
use broker::hub::processor::spawn_queue_processor;
use broker::hub::Hub;
use broker::observability;
use broker::store::sqlite::SqliteStore;
use broker::store::Store;
use broker::tls;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    let config = BrokerConfig::parse();
    let metrics_handle = observability::init_observability();

    // One TLS crypto provider for the whole process; the HTTP client and
    // the listener otherwise disagree on the rustls default.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::connect(&config.db)
            .await
            .with_context(|| format!("open store {}", config.db))?,
    );
    tracing::info!(
        backend = store.backend_name(),
        durable = store.is_durable(),
        "broker store ready"
    );

    auth::ensure_admin_user(&store, config.initial_admin_password.as_deref())
        .await
        .context("bootstrap admin user")?;

    let hub = Hub::new(Arc::clone(&store));
    hub.register_connector("mock", Arc::new(MockConnector::new()));
    hub.register_connector(
        "fcm",
        Arc::new(FcmConnector::new(&config.fcm_creds).context("build fcm connector")?),
    );
    hub.register_connector("apns", Arc::new(ApnsConnector::new()));
    hub.register_connector(
        "webhook",
        Arc::new(WebhookConnector::new().context("build webhook connector")?),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let processor = spawn_queue_processor(hub.clone(), shutdown_rx);

    if let Some(metrics_bind) = config.metrics_bind {
        tokio::spawn(observability::serve_metrics(metrics_handle, metrics_bind));
        tracing::info!(%metrics_bind, "metrics listener started");
    }

    let state = AppState::new(hub, store, auth::jwt_secret_from_env());
    let app = build_router(state);
    let addr = config.listen_addr()?;

    // Ctrl-C stops accepting connections, then lets the processor finish
    // its in-flight sweep before the process exits.
    let handle = axum_server::Handle::new();
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
            handle.graceful_shutdown(Some(Duration::from_secs(5)));
        });
    }

    if config.http {
        tracing::info!(%addr, "broker listening (HTTP, TLS disabled)");
        tracing::warn!("traffic is unencrypted; ensure a secure proxy fronts this listener");
        axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("serve http")?;
    } else {
        tls::ensure_tls_material(&config.cert, &config.key)?;
        let tls_config = RustlsConfig::from_pem_file(&config.cert, &config.key)
            .await
            .context("load TLS material")?;
        tracing::info!(%addr, "broker listening (TLS)");
        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("serve https")?;
    }

    let _ = processor.await;
    tracing::info!("broker stopped");
    Ok(())
}
