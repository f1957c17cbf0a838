//! Controller behind one record list/form page.
//!
//! ```text
//! Idle -> Loading -> Loaded | Error
//! Loaded -> Submitting -> Loading (re-fetch) | Loaded (field errors) | Error
//! any -> Fatal   (session that can never load)
//! ```
//!
//! Loads are split into [`RecordPage::begin_load`] and
//! [`RecordPage::apply_load`] so the fetch itself can run anywhere. Each load
//! gets a [`LoadTicket`]; results for an outdated ticket, or arriving after
//! [`RecordPage::unmount`], are dropped.

use std::sync::Arc;

use anyhow::Result;
use schoolhub_core::errors::{ErrorKind, HubError};
use schoolhub_core::{AccessPolicy, Role, TenantContext};
use serde_json::Value;

use crate::gateway::MutationGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    Idle,
    Loading,
    Loaded,
    Submitting,
    Error(String),
    Fatal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    /// No store is configured; the page shows placeholder content only.
    Simulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

pub struct RecordPage {
    record_type: String,
    policy: Arc<AccessPolicy>,
    session: Option<TenantContext>,
    state: PageState,
    records: Vec<Value>,
    field_errors: Option<Value>,
    generation: u64,
    mounted: bool,
    simulation: bool,
}

fn message_of(err: &anyhow::Error) -> String {
    HubError::from_anyhow(err)
        .map(|h| h.message.clone())
        .unwrap_or_else(|| err.to_string())
}

impl RecordPage {
    pub fn new(
        record_type: impl Into<String>,
        policy: Arc<AccessPolicy>,
        store_available: bool,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            policy,
            session: None,
            state: PageState::Idle,
            records: Vec::new(),
            field_errors: None,
            generation: 0,
            mounted: true,
            simulation: !store_available,
        }
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    /// Field messages from the last rejected submit, e.g. `{"score": [...]}`.
    pub fn field_errors(&self) -> Option<&Value> {
        self.field_errors.as_ref()
    }

    pub fn banner(&self) -> Option<Banner> {
        self.simulation.then_some(Banner::Simulation)
    }

    pub fn session(&self) -> Option<&TenantContext> {
        self.session.as_ref()
    }

    /// Whether the add/edit form is offered at all.
    pub fn can_edit(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| self.policy.can_mutate(s.role, &self.record_type))
            .unwrap_or(false)
    }

    /// Role and school may arrive late and one at a time. An unknown role
    /// keeps the page idle; a session that resolves starts a load.
    pub fn set_session(&mut self, role: Option<Role>, tenant: Option<&str>) -> Option<LoadTicket> {
        let Some(role) = role else {
            self.session = None;
            self.state = PageState::Idle;
            return None;
        };

        match TenantContext::resolve(role, tenant) {
            Ok(session) => {
                // A school arriving after the role lifts an earlier Fatal.
                self.session = Some(session);
                self.state = PageState::Idle;
                self.field_errors = None;
                self.begin_load()
            }
            Err(err) => {
                self.session = None;
                self.state = PageState::Fatal(match err.kind {
                    ErrorKind::NotAuthenticated => "missing school for this session".to_string(),
                    _ => err.message,
                });
                None
            }
        }
    }

    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if !self.mounted || self.session.is_none() || matches!(self.state, PageState::Fatal(_)) {
            return None;
        }
        if self.simulation {
            self.records.clear();
            self.state = PageState::Loaded;
            return None;
        }

        self.generation += 1;
        self.state = PageState::Loading;
        Some(LoadTicket {
            generation: self.generation,
        })
    }

    /// Returns false when the result was discarded.
    pub fn apply_load(&mut self, ticket: LoadTicket, result: Result<Vec<Value>>) -> bool {
        if !self.mounted || ticket.generation != self.generation {
            tracing::debug!(
                page = %self.record_type,
                ticket = ticket.generation,
                "dropping stale load"
            );
            return false;
        }

        match result {
            Ok(records) => {
                self.records = records;
                self.state = PageState::Loaded;
            }
            Err(err) => self.fail(err),
        }
        true
    }

    fn fail(&mut self, err: anyhow::Error) {
        if HubError::kind_of(&err) == ErrorKind::StoreUnavailable {
            self.simulation = true;
            self.records.clear();
            self.state = PageState::Loaded;
        } else {
            self.state = PageState::Error(message_of(&err));
        }
    }

    pub fn begin_submit(&mut self) -> Result<(), HubError> {
        if self.state != PageState::Loaded {
            return Err(HubError::bad_request("page is not ready for changes"));
        }
        let Some(session) = &self.session else {
            return Err(HubError::not_authenticated("no session"));
        };
        if !self.policy.can_mutate(session.role, &self.record_type) {
            return Err(HubError::permission_denied(format!(
                "role '{}' may not modify {}",
                session.role, self.record_type
            )));
        }
        if self.simulation {
            return Err(HubError::store_unavailable("record store is not configured"));
        }

        self.field_errors = None;
        self.state = PageState::Submitting;
        Ok(())
    }

    /// A successful write always re-fetches; the returned ticket is that load.
    pub fn finish_submit(&mut self, result: Result<Value>) -> Option<LoadTicket> {
        if !self.mounted {
            return None;
        }

        match result {
            Ok(_) => self.begin_load(),
            Err(err) => {
                match HubError::from_anyhow(&err) {
                    Some(hub) if hub.kind == ErrorKind::ValidationError => {
                        self.field_errors = hub.errors.clone();
                        self.state = PageState::Loaded;
                    }
                    _ => self.fail(err),
                }
                None
            }
        }
    }

    pub fn retry(&mut self) -> Option<LoadTicket> {
        match self.state {
            PageState::Error(_) => self.begin_load(),
            _ => None,
        }
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// Case-insensitive substring match over string and number fields of
    /// the loaded records. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Value> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.records.iter().collect();
        }

        self.records
            .iter()
            .filter(|r| {
                r.as_object().is_some_and(|obj| {
                    obj.values().any(|v| match v {
                        Value::String(s) => s.to_lowercase().contains(&needle),
                        Value::Number(n) => n.to_string().contains(&needle),
                        _ => false,
                    })
                })
            })
            .collect()
    }

    fn active_session(&self) -> Result<TenantContext> {
        self.session
            .clone()
            .ok_or_else(|| HubError::not_authenticated("no session").into_anyhow())
    }

    /// Load through the gateway. Returns false if nothing was applied.
    pub async fn refresh(&mut self, gateway: &MutationGateway) -> bool {
        let Some(ticket) = self.begin_load() else {
            return false;
        };
        let res = match self.active_session() {
            Ok(session) => gateway.list(&self.record_type, &session).await,
            Err(e) => Err(e),
        };
        self.apply_load(ticket, res)
    }

    /// Create or update, then re-fetch.
    pub async fn submit(
        &mut self,
        gateway: &MutationGateway,
        payload: Value,
    ) -> Result<(), HubError> {
        self.begin_submit()?;
        let session = self.active_session().map_err(HubError::normalize)?;

        let res = gateway.write(&self.record_type, payload, &session).await;
        self.reload_after(gateway, &session, res).await;
        Ok(())
    }

    pub async fn delete(&mut self, gateway: &MutationGateway, id: &str) -> Result<(), HubError> {
        self.begin_submit()?;
        let session = self.active_session().map_err(HubError::normalize)?;

        let res = gateway.remove(&self.record_type, id, &session).await;
        self.reload_after(gateway, &session, res).await;
        Ok(())
    }

    async fn reload_after(
        &mut self,
        gateway: &MutationGateway,
        session: &TenantContext,
        res: Result<Value>,
    ) {
        if let Some(ticket) = self.finish_submit(res) {
            let res = gateway.list(&self.record_type, session).await;
            self.apply_load(ticket, res);
        }
    }
}
