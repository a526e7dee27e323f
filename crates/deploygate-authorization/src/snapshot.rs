//! Read-only policy snapshot shared by request handlers
//!
//! Handlers take an `Arc<PolicyTable>` once per request and evaluate against
//! it; a reload swaps the pointer without disturbing in-flight evaluations.

use std::sync::Arc;

use deploygate_core::{Result, ScopeError};
use parking_lot::RwLock;
use tracing::info;

use crate::config::{EngineConfig, ReloadPolicy};
use crate::policy::PolicyTable;

/// Injected holder of the active [`PolicyTable`].
#[derive(Debug)]
pub struct PolicyStore {
    current: RwLock<Arc<PolicyTable>>,
    reload: ReloadPolicy,
}

impl PolicyStore {
    /// Create a store around an already validated table.
    pub fn new(table: PolicyTable, reload: ReloadPolicy) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
            reload,
        }
    }

    /// Build a store from configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(config.to_table()?, config.reload))
    }

    /// The active table.
    pub fn snapshot(&self) -> Arc<PolicyTable> {
        self.current.read().clone()
    }

    /// Reload behaviour of this store.
    pub fn reload_policy(&self) -> ReloadPolicy {
        self.reload
    }

    /// Replace the active table.
    ///
    /// Fails with `Invalid` when the store is static.
    pub fn reload(&self, table: PolicyTable) -> Result<()> {
        if self.reload == ReloadPolicy::Static {
            return Err(ScopeError::invalid(
                "policy store is static, reloading is disabled",
            ));
        }
        *self.current.write() = Arc::new(table);
        info!("policy table reloaded");
        Ok(())
    }

    /// Validate `config` and replace the active table with it.
    pub fn reload_from_config(&self, config: &EngineConfig) -> Result<()> {
        self.reload(config.to_table()?)
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(PolicyTable::default(), ReloadPolicy::Static)
    }
}
