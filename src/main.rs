use std::sync::Arc;
use tracing::info;

use arcane_server::api;
use arcane_server::profile::UserRole;
use arcane_server::storage::{catalog_store::CatalogStore, profile_store::ProfileStore, seed_data};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    // ========================================================================
    // 1. Open LMDB stores (synchronous, embedded DB)
    // ========================================================================
    let catalog_path =
        std::env::var("CATALOG_LMDB_PATH").unwrap_or_else(|_| "data/catalog".to_string());
    let profile_path =
        std::env::var("PROFILE_LMDB_PATH").unwrap_or_else(|_| "data/profiles".to_string());
    let lmdb_max_size: usize = {
        let raw = std::env::var("LMDB_MAX_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(500_000_000);
        // LMDB requires map size to be a multiple of the OS page size (4096)
        let page_size = 4096_usize;
        (raw + page_size - 1) / page_size * page_size
    };

    let catalog = Arc::new(
        CatalogStore::new(&catalog_path, lmdb_max_size)
            .expect("Failed to initialize catalog store"),
    );
    seed_data::seed_all(&catalog).expect("Failed to seed catalog data");
    info!("catalog store initialized at: {}", catalog_path);

    let profiles = Arc::new(
        ProfileStore::new(&profile_path, lmdb_max_size)
            .expect("Failed to initialize profile store"),
    );
    info!("profile store initialized at: {}", profile_path);

    // ========================================================================
    // 2. Bootstrap admin roles from the environment
    //    ADMIN_CALLERS is a comma-separated list of caller ids.
    // ========================================================================
    if let Ok(admins) = std::env::var("ADMIN_CALLERS") {
        for caller in admins.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            profiles
                .put_role(caller, UserRole::Admin)
                .expect("Failed to bootstrap admin role");
            info!("bootstrapped admin role for {}", caller);
        }
    }

    // ========================================================================
    // 3. Start the HTTP API server
    // ========================================================================
    let port: u16 = std::env::var("API_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8750);

    if let Err(e) = api::start_api_server(profiles, catalog, port).await {
        tracing::error!("API server error: {}", e);
        std::process::exit(1);
    }
}
