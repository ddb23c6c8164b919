use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, db::SharedStore, services::payment::PaymentGateway};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub gateway: Arc<dyn PaymentGateway>,
    pub config: Config,
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
