use std::sync::Arc;

use crate::config::Config;
use crate::ledger::SharedLedger;
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: SharedLedger,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, ledger: SharedLedger) -> Self {
        Self {
            config: Arc::new(config),
            ledger,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
