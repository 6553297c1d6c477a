//! State shared across all request-handling workers.

use std::sync::Arc;

use auth_adapters::{AdmissionController, Authenticator};
use services::ModerationService;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub moderation: Arc<ModerationService>,
    pub admission: Arc<AdmissionController>,
    pub metrics: Arc<Metrics>,
    /// Whether proxy-supplied client address headers are honored.
    pub trust_proxy_headers: bool,
}
