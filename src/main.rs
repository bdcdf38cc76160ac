use netc::config::Config;
use netc::http::request::Request;
use netc::http::response::Response;
use netc::server::Server;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();

    let mut server = Server::new(cfg);

    server
        .register("GET", "/", |_req: &Request, res: &mut Response| {
            res.set_body("Hello from NetC\n");
        })
        .map_err(|e| anyhow::anyhow!("Failed to register route: {:?}", e))?;

    server
        .register("GET", "/users", |_req: &Request, res: &mut Response| {
            res.add_header("Content-Type", "application/json").ok();
            res.set_body(r#"{"users": [{"name": "Davide"}, {"name": "sissi"}]}"#);
        })
        .map_err(|e| anyhow::anyhow!("Failed to register route: {:?}", e))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    server.run(shutdown_rx).await
}
