//! Configuration for the forwarder.
//!
//! Every option has a default, so an empty file (or no file) gives a working
//! forwarder. Environment variables prefixed with `UDCN_FWD_` override file
//! values, e.g. `UDCN_FWD_CS_CAPACITY=1024`.

use anyhow::{ensure, Context, Result};
use config::{Config, Environment, File};
use rust_udcn_common::{ndn::DEFAULT_INTEREST_LIFETIME_MS, types::MAX_CS_ENTRIES};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::cs::{policy::MAX_LATENCY_WEIGHT, CsPolicyKind};
use crate::unsolicited::UnsolicitedDataKind;

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "UDCN_FWD";

/// Upper bound for the straggler time and the Dead Nonce List lifetime.
pub const MAX_TIMER_MS: u64 = 24 * 60 * 60 * 1000;

/// How many in-records of a PIT entry one Data packet satisfies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SatisfyPolicy {
    /// Every downstream waiting on a matched entry gets the Data.
    #[default]
    All,
    /// Only the downstream that asked last; the others stay pending.
    MostRecent,
}

/// Forwarder options
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForwarderConfig {
    /// Maximum number of Data packets in the content store
    pub cs_capacity: usize,

    /// Content store replacement policy
    pub cs_policy: CsPolicyKind,

    /// Grace period before a satisfied or rejected PIT entry is removed (in milliseconds)
    pub straggler_time_ms: u64,

    /// How long a retired nonce stays in the Dead Nonce List (in milliseconds)
    pub dead_nonce_lifetime_ms: u64,

    /// Maximum number of Dead Nonce List entries
    pub dead_nonce_capacity: usize,

    /// Lifetime given to Interests that carry none (in milliseconds)
    pub default_interest_lifetime_ms: u32,

    pub satisfy_policy: SatisfyPolicy,

    pub unsolicited_data: UnsolicitedDataKind,

    /// Forward straight to FIB next hops before asking the strategy
    pub direct_fib_forwarding: bool,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            cs_capacity: MAX_CS_ENTRIES,
            cs_policy: CsPolicyKind::Lru,
            straggler_time_ms: 100,
            dead_nonce_lifetime_ms: 6000,
            dead_nonce_capacity: 65536,
            default_interest_lifetime_ms: DEFAULT_INTEREST_LIFETIME_MS,
            satisfy_policy: SatisfyPolicy::All,
            unsolicited_data: UnsolicitedDataKind::DropAll,
            direct_fib_forwarding: true,
        }
    }
}

impl ForwarderConfig {
    /// Loads the configuration from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .context("Failed to read forwarder configuration")?;
        let config: ForwarderConfig = settings
            .try_deserialize()
            .context("Invalid forwarder configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the forwarder cannot turn into timers or scores.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.straggler_time_ms <= MAX_TIMER_MS,
            "straggler_time_ms must be at most {} (got {})",
            MAX_TIMER_MS,
            self.straggler_time_ms
        );
        ensure!(
            self.dead_nonce_lifetime_ms <= MAX_TIMER_MS,
            "dead_nonce_lifetime_ms must be at most {} (got {})",
            MAX_TIMER_MS,
            self.dead_nonce_lifetime_ms
        );
        if let CsPolicyKind::LatencyWeighted { weight } = self.cs_policy {
            ensure!(
                (0.0..=MAX_LATENCY_WEIGHT).contains(&weight),
                "cs_policy weight must be within 0..={} (got {})",
                MAX_LATENCY_WEIGHT,
                weight
            );
        }
        Ok(())
    }

    /// Straggler time, capped at [`MAX_TIMER_MS`].
    pub fn straggler_time(&self) -> Duration {
        Duration::from_millis(self.straggler_time_ms.min(MAX_TIMER_MS))
    }

    /// Dead Nonce List lifetime, capped at [`MAX_TIMER_MS`].
    pub fn dead_nonce_lifetime(&self) -> Duration {
        Duration::from_millis(self.dead_nonce_lifetime_ms.min(MAX_TIMER_MS))
    }
}
