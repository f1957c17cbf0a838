use crate::services::adapters::RecordStore;

pub type AdminParams = schoolhub_axum::params::RestParams;

#[derive(Default)]
pub struct AdminState {
    pub store: RecordStore,
}

impl AdminState {
    pub fn new(store_enabled: bool) -> Self {
        Self {
            store: RecordStore::new(store_enabled),
        }
    }
}
