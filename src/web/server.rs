use crate::error::{Error, Result};
use crate::wallet::Wallet;
use crate::web::api;
use log::info;
use std::net::SocketAddr;

pub struct WebServer {
    wallet: Wallet,
}

impl WebServer {
    pub fn new(wallet: Wallet) -> Self {
        Self { wallet }
    }

    /// Serves until Ctrl-C.
    pub async fn start(&self, host: &str, port: u16) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| Error::ConfigError(format!("Invalid listen address {}:{}: {}", host, port, e)))?;

        let (bound, server) = warp::serve(api::routes(self.wallet.clone()))
            .try_bind_with_graceful_shutdown(addr, async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown signal received");
            })
            .map_err(|e| Error::ConfigError(format!("Failed to bind {}: {}", addr, e)))?;

        info!("Starting web server on {}", bound);
        server.await;
        info!("Web server stopped");
        Ok(())
    }
}
