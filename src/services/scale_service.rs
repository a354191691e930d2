//! Scale service - shared state for the scale-in / scale-out orchestrations
//!
//! Two effect channels with different guarantees are kept apart here:
//! store writes go through one atomic change bundle, admin actions are
//! issued immediately and only ever reported when they fail.

use tracing::{info, warn};

use crate::domain::rewrite::{default_nonce, DEFAULT_FINGERPRINT_LEN};
use crate::infrastructure::admin::{AdminAction, AdminInvoker};
use crate::infrastructure::store::ConfigStore;

/// Tunables for a scale run
#[derive(Debug, Clone)]
pub struct ScaleOptions {
    /// Nonce mixed into SU / SI fingerprints; a fresh one per run when unset
    pub nonce: Option<String>,
    pub fingerprint_len: usize,
    /// Dump each object as it is queued for creation
    pub echo_objects: bool,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            nonce: None,
            fingerprint_len: DEFAULT_FINGERPRINT_LEN,
            echo_objects: true,
        }
    }
}

impl ScaleOptions {
    /// Builder: fix the nonce (reproducible clone names)
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn with_fingerprint_len(mut self, len: usize) -> Self {
        self.fingerprint_len = len;
        self
    }

    pub fn with_echo_objects(mut self, echo: bool) -> Self {
        self.echo_objects = echo;
        self
    }

    pub(crate) fn nonce_for_run(&self) -> String {
        self.nonce.clone().unwrap_or_else(default_nonce)
    }
}

/// Runs scale operations against one store with one admin invoker
pub struct ScaleService<S: ConfigStore, A: AdminInvoker> {
    pub(crate) store: S,
    pub(crate) admin: A,
    pub(crate) options: ScaleOptions,
}

impl<S: ConfigStore, A: AdminInvoker> ScaleService<S, A> {
    pub fn new(store: S, admin: A) -> Self {
        Self {
            store,
            admin,
            options: ScaleOptions::default(),
        }
    }

    /// Builder: set options
    pub fn with_options(mut self, options: ScaleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    /// Issue an admin action; failures are logged and counted, never raised
    pub(crate) async fn admin_best_effort(&self, action: AdminAction, failures: &mut usize) {
        info!("{}", self.admin.describe(&action));
        if let Err(e) = self.admin.invoke(&action).await {
            warn!("Admin action failed (non-fatal): {}", e);
            *failures += 1;
        }
    }
}
