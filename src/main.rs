use tracing::info;

use depot::{Config, FileStore, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = depot::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        depot::logging::init_console_only(&config.logging.level);
    }

    info!("depot - LAN file drop box");

    let store = match FileStore::new(&config.storage.root) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to initialize file storage at {}: {}", config.storage.root, e);
            std::process::exit(1);
        }
    };
    info!("File storage initialized at: {}", config.storage.root);

    let server = WebServer::new(&config.server, &config.web, &config.storage, store);
    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
