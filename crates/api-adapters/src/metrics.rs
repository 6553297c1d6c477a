//! Prometheus counters for the login and moderation surfaces.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum LoginOutcome {
    Issued,
    Rejected,
    Throttled,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct LoginLabels {
    pub outcome: LoginOutcome,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum ModerationAction {
    Approve,
    Remove,
    Delete,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum ContentKind {
    Post,
    Comment,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ModerationLabels {
    pub action: ModerationAction,
    pub kind: ContentKind,
}

pub struct Metrics {
    registry: Registry,
    login_attempts: Family<LoginLabels, Counter>,
    moderation_actions: Family<ModerationLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let login_attempts = Family::<LoginLabels, Counter>::default();
        registry.register(
            "warden_login_attempts",
            "Login attempts by outcome",
            login_attempts.clone(),
        );
        let moderation_actions = Family::<ModerationLabels, Counter>::default();
        registry.register(
            "warden_moderation_actions",
            "Moderation actions by kind and action",
            moderation_actions.clone(),
        );
        Self {
            registry,
            login_attempts,
            moderation_actions,
        }
    }

    pub fn record_login(&self, outcome: LoginOutcome) {
        self.login_attempts.get_or_create(&LoginLabels { outcome }).inc();
    }

    pub fn record_moderation(&self, action: ModerationAction, kind: ContentKind) {
        self.moderation_actions
            .get_or_create(&ModerationLabels { action, kind })
            .inc();
    }

    /// Text exposition for the `/metrics` endpoint.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // encoding only fails on a broken fmt::Write impl; String's cannot
        encode(&mut buffer, &self.registry).expect("metrics encoding");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_the_exposition() {
        let metrics = Metrics::new();
        metrics.record_login(LoginOutcome::Throttled);
        metrics.record_moderation(ModerationAction::Approve, ContentKind::Post);

        let text = metrics.encode();
        assert!(text.contains("warden_login_attempts"));
        assert!(text.contains("warden_moderation_actions"));
    }
}
