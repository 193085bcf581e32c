//! Contains the [ReplayConfig].

use crate::{ReplayOrchestrator, ReplayService};
use alloy_primitives::Address;
use hilo_engine::{EngineClient, EngineDriver, JwtSecret};
use hilo_providers::{AlloyLegacyChainProvider, AlloyTargetChainProvider};
use std::time::Duration;

/// The default interval between replay polling ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the replay service.
///
/// Consumed by value when the service is built, so no shared mutable
/// settings outlive construction.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// JSON-RPC endpoint of the legacy chain.
    pub legacy_endpoint: reqwest::Url,
    /// Public JSON-RPC endpoint of the target chain.
    pub target_endpoint: reqwest::Url,
    /// Authenticated engine endpoint of the target node.
    pub engine_endpoint: String,
    /// Secret signing the per-call engine tokens.
    pub jwt_secret: JwtSecret,
    /// The fee recipient set on replayed blocks.
    pub fee_recipient: Address,
    /// The interval between polling ticks.
    pub poll_interval: Duration,
    /// The deadline applied to each engine call.
    pub call_timeout: Duration,
}

impl ReplayConfig {
    /// Builds an orchestrator wired to the configured endpoints.
    pub fn orchestrator(
        self,
    ) -> ReplayOrchestrator<AlloyLegacyChainProvider, AlloyTargetChainProvider, EngineClient> {
        let legacy = AlloyLegacyChainProvider::new_http(self.legacy_endpoint);
        let target = AlloyTargetChainProvider::new_http(self.target_endpoint);
        let client = EngineClient::new(self.engine_endpoint, self.jwt_secret);
        let driver = EngineDriver::with_timeout(client, self.call_timeout);
        ReplayOrchestrator::new(legacy, target, driver, self.fee_recipient)
    }

    /// Builds the replay service for this configuration.
    pub fn service(
        self,
    ) -> ReplayService<AlloyLegacyChainProvider, AlloyTargetChainProvider, EngineClient> {
        let poll_interval = self.poll_interval;
        ReplayService::new(self.orchestrator(), poll_interval)
    }
}
