//! schoolhub-axum: Axum adapter for SchoolHub.
//!
//! Builds REST routers over registered record services, turns the role and
//! school headers into a tenant context, and maps hub errors onto HTTP
//! responses.

pub mod app;
pub mod params;
pub mod rest;
pub mod session;
pub mod state;
mod error;
pub use error::HubAxumError;
pub use state::HubAxumState;

pub use app::{axum, AxumApp};
pub use session::{session_from_headers, Session, ROLE_HEADER, TENANT_HEADER};
