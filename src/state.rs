use std::sync::Arc;

use crate::catalog::MachineCatalog;
use crate::config::Config;
use crate::db::Store;
use crate::engine::Engine;

/// Everything the HTTP layer and the CLI commands share: the config, the
/// store, the fixed machine catalog, and the reservation engine built on
/// top of both.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub catalog: MachineCatalog,

    pub engine: Arc<Engine>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let catalog = MachineCatalog::from_config(&config.machines);
        let engine = Arc::new(Engine::new(store.clone(), catalog.clone()));

        Ok(Self {
            config,
            store,
            catalog,
            engine,
        })
    }
}
