use std::sync::Arc;

use porthole::config::Config;
use porthole::handler::{Echo, Handler, Mount, StaticFiles};
use porthole::server::ConnectionServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();

    let mut server = ConnectionServer::new(cfg.server.address);
    server.headers_mut().set("Server", cfg.server.name.as_str());

    if server.bind(cfg.server.port) == 0 || !server.listen(cfg.server.backlog) {
        anyhow::bail!("{}", server.error().unwrap_or("failed to start server"));
    }

    let files = StaticFiles::new(&cfg.static_files.root).with_index(&cfg.static_files.index);
    tracing::info!("Serving {}", files.root().display());

    let handler: Arc<dyn Handler> = if cfg.diagnostics {
        Arc::new(Mount::new("/_echo", Echo, files))
    } else {
        Arc::new(files)
    };

    tokio::select! {
        res = server.serve(handler) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
