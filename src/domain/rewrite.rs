//! Identity rewriting for scale-out clones
//!
//! A template node's footprint is copied under a new identity:
//! - node segments (`safNode`, `safAmfNode`) take the new host name,
//! - SU / SI segments get a short md5 fingerprint of
//!   `segment + new host + nonce`, so clones never collide with the template
//!   yet stay reproducible for a given nonce,
//! - a handful of attributes referencing the old node are repointed.

use super::amf::{attr, rdn, AdminState};
use super::dn::{split_rdn_and_parent, Dn};
use super::object::{ConfigObject, EntityClass};
use crate::error::DnError;

/// Default length of SU / SI fingerprints
pub const DEFAULT_FINGERPRINT_LEN: usize = 10;

/// Per-run nonce: wall-clock seconds with sub-second precision
pub fn default_nonce() -> String {
    let now = chrono::Utc::now();
    format!(
        "{}.{:06}",
        now.timestamp(),
        now.timestamp_subsec_micros()
    )
}

/// Drop the store's bookkeeping attributes from a configuration-scope read
pub fn prepare_for_write(object: &mut ConfigObject) {
    for name in attr::IMM_BOOKKEEPING {
        object.remove(name);
    }
}

/// Rewrites cloned objects for a new node
#[derive(Debug, Clone)]
pub struct IdentityRewriter {
    hostname: String,
    amf_node_dn: Dn,
    nonce: String,
    fingerprint_len: usize,
}

impl IdentityRewriter {
    pub fn new(hostname: impl Into<String>, amf_node_dn: Dn, nonce: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            amf_node_dn,
            nonce: nonce.into(),
            fingerprint_len: DEFAULT_FINGERPRINT_LEN,
        }
    }

    /// Builder: set fingerprint length (clamped to the md5 hex length)
    pub fn with_fingerprint_len(mut self, len: usize) -> Self {
        self.fingerprint_len = len.clamp(1, 32);
        self
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Truncated md5 of `segment + hostname + nonce`
    pub fn fingerprint(&self, segment: &str) -> String {
        let input = format!("{}{}{}", segment, self.hostname, self.nonce);
        let digest = format!("{:x}", md5::compute(input.as_bytes()));
        digest[..self.fingerprint_len].to_string()
    }

    /// Compute the clone's DN
    pub fn rename_dn(&self, dn: &Dn) -> Dn {
        dn.rewrite_segments(|seg_attr, value| match seg_attr {
            rdn::SERVICE_UNIT | rdn::SERVICE_INSTANCE => {
                Some(self.fingerprint(&format!("{}={}", seg_attr, value)))
            }
            rdn::CLM_NODE | rdn::AMF_NODE => Some(self.hostname.clone()),
            _ => None,
        })
    }

    /// Set `new_dn` and repoint node-specific attributes.
    ///
    /// The object must come from a configuration-scope read.
    pub fn rewrite(&self, object: &mut ConfigObject) {
        object.new_dn = Some(self.rename_dn(&object.dn));

        match object.class() {
            Some(EntityClass::ServiceUnit) => {
                object.set(attr::SU_HOST_NODE_OR_NODE_GROUP, self.amf_node_dn.as_str());
                object.set(attr::SU_ADMIN_STATE, AdminState::Unlocked.value().to_string());
            }
            Some(EntityClass::Node) => {
                object.set(
                    attr::NODE_ADMIN_STATE,
                    AdminState::LockedInstantiation.value().to_string(),
                );
                if let Some(clm_node) = object.get_dn(attr::NODE_CLM_NODE) {
                    let renamed = clm_node.rename_segment(rdn::CLM_NODE, &self.hostname);
                    object.set(attr::NODE_CLM_NODE, renamed.as_str());
                }
            }
            _ => {}
        }
    }
}

/// Turn a rewritten object into `(object, parent)` ready for a create.
///
/// The RDN attribute is set to the new leaf segment and the transient
/// `new_dn` is folded into `dn`.
pub fn into_create(mut object: ConfigObject) -> Result<(ConfigObject, Dn), DnError> {
    let target = object.target_dn().clone();
    let (rdn, parent) = split_rdn_and_parent(&target)?;
    let rdn_attribute = object.rdn_attribute.clone();
    object.set(&rdn_attribute, rdn);
    object.dn = target;
    object.new_dn = None;
    Ok((object, parent))
}
