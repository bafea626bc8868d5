//! Application Configuration
//!
//! Configuration for the Audit application layer.

use std::time::Duration;

/// Audit application configuration
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// How often stale request contexts are swept
    pub sweep_interval: Duration,
    /// Contexts older than this are removed by the sweep
    pub max_context_age: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(120), // 2 minutes
            max_context_age: Duration::from_secs(300), // 5 minutes
        }
    }
}
