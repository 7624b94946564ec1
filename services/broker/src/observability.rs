use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the tracing subscriber and the Prometheus metrics recorder.
///
/// Safe to call more than once (tests); later calls return the existing
/// recorder handle.
pub fn init_observability() -> PrometheusHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    install_metrics_recorder()
}

/// Serve the Prometheus scrape endpoint on a dedicated listener.
pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let app = axum::Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await
}

fn install_metrics_recorder() -> PrometheusHandle {
    if let Some(handle) = METRICS_HANDLE.get() {
        return handle.clone();
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle.clone());
            handle
        }
        // A recorder may already be installed elsewhere in the process;
        // fall back to a detached handle so callers still get renders.
        Err(err) => {
            tracing::warn!(error = %err, "metrics recorder already installed");
            let handle = PrometheusBuilder::new().build_recorder().handle();
            let _ = METRICS_HANDLE.set(handle.clone());
            handle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let first = init_observability();
        let second = init_observability();
        // Both handles render from the same registry without panicking.
        let _ = first.render();
        let _ = second.render();
    }
}
