//! Runtime configuration for the Rooter and the DID State Projection.
//!
//! Follows the teacher's builder-pattern shape: a plain `Config` struct with
//! a `Default` impl, plus a fluent `ConfigBuilder` for callers that want to
//! override only the fields they care about.

use serde::{Deserialize, Serialize};

/// Configuration consumed by the Rooter (batching & anchoring pipeline).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RooterConfig {
    /// Wall-clock interval, in seconds, between pipeline ticks.
    pub batch_interval_seconds: f64,
}

impl Default for RooterConfig {
    fn default() -> Self {
        Self {
            batch_interval_seconds: 60.0,
        }
    }
}

/// Fluent builder for [`RooterConfig`].
pub struct RooterConfigBuilder {
    inner: RooterConfig,
}

impl RooterConfigBuilder {
    /// Starts a new builder pre-populated with [`RooterConfig::default`].
    pub fn new() -> Self {
        Self {
            inner: RooterConfig::default(),
        }
    }

    /// Overrides the tick interval.
    pub fn batch_interval_seconds(mut self, seconds: f64) -> Self {
        self.inner.batch_interval_seconds = seconds;
        self
    }

    /// Consumes the builder, returning an immutable configuration value.
    pub fn finish(self) -> RooterConfig {
        self.inner
    }
}

impl Default for RooterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration consumed by the DID State Projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectionConfig {
    /// The DID method name prefixed onto resolved DIDs (e.g. `"sidetree"`
    /// for `did:sidetree:<uniquePortion>`).
    pub did_method_name: String,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            did_method_name: "sidetree".into(),
        }
    }
}

/// Fluent builder for [`ProjectionConfig`].
pub struct ProjectionConfigBuilder {
    inner: ProjectionConfig,
}

impl ProjectionConfigBuilder {
    /// Starts a new builder pre-populated with [`ProjectionConfig::default`].
    pub fn new() -> Self {
        Self {
            inner: ProjectionConfig::default(),
        }
    }

    /// Overrides the DID method name.
    pub fn did_method_name<S: Into<String>>(mut self, name: S) -> Self {
        self.inner.did_method_name = name.into();
        self
    }

    /// Consumes the builder, returning an immutable configuration value.
    pub fn finish(self) -> ProjectionConfig {
        self.inner
    }
}

impl Default for ProjectionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
