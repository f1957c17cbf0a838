use std::collections::HashMap;
use std::sync::Arc;

use crate::RecordService;

/// Maps service names (record types) to service instances.
pub struct ServiceRegistry<R, P = ()> {
    services: HashMap<String, Arc<dyn RecordService<R, P>>>,
}

impl<R, P> ServiceRegistry<R, P> {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    pub fn register<S>(&mut self, name: S, service: Arc<dyn RecordService<R, P>>)
    where
        S: Into<String>,
    {
        self.services.insert(name.into(), service);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn RecordService<R, P>>> {
        self.services.get(name)
    }
}

impl<R, P> Default for ServiceRegistry<R, P> {
    fn default() -> Self {
        Self::new()
    }
}
