//! Scale-out: clone a template node's configuration for a new node
//!
//! The template's footprint is re-read in configuration scope, renamed for
//! the new host and created in one bundle, parents first. The new node then
//! joins the template's node groups and is unlocked.

use tracing::{debug, info};

use super::collector::FootprintCollector;
use super::scale_service::ScaleService;
use super::topology::TopologyResolver;
use crate::domain::amf::{attr, rdn, AdminOperation};
use crate::domain::bundle::{BundleOp, ChangeBundle};
use crate::domain::dn::Dn;
use crate::domain::rewrite::{into_create, prepare_for_write, IdentityRewriter};
use crate::error::ScaleError;
use crate::infrastructure::admin::{AdminAction, AdminInvoker};
use crate::infrastructure::store::{ConfigStore, Scope};
use crate::ui;

/// Outcome of a committed scale-out
#[derive(Debug, Clone)]
pub struct ScaleOutReport {
    pub hostname: String,
    pub template: String,
    /// New AMF node DN
    pub new_node: Dn,
    /// New CLM node DN
    pub new_clm_node: Dn,
    /// Created DNs, in creation order
    pub created: Vec<Dn>,
    /// Node groups the new node joined
    pub node_groups: Vec<Dn>,
    pub operations: Vec<BundleOp>,
    pub admin_failures: usize,
    /// Nonce the SU / SI fingerprints were derived from
    pub nonce: String,
}

#[derive(Debug, Clone)]
pub enum ScaleOutOutcome {
    /// The host already runs service units; nothing was changed
    AlreadyScaled { hostname: String },
    Scaled(ScaleOutReport),
}

impl<S: ConfigStore, A: AdminInvoker> ScaleService<S, A> {
    /// Clone the footprint of `template` onto `hostname`
    pub async fn scale_out(
        &mut self,
        hostname: &str,
        template: &str,
    ) -> Result<ScaleOutOutcome, ScaleError> {
        info!("Scaling out: {} (copy from {})", hostname, template);

        let resolver = TopologyResolver::new(&self.store);
        if resolver.hosts_any_service_unit(hostname) {
            info!("{} already hosts service units, nothing to do", hostname);
            return Ok(ScaleOutOutcome::AlreadyScaled {
                hostname: hostname.to_string(),
            });
        }

        let source = resolver.find_node(template)?;
        let new_node = source.amf_node.rename_segment(rdn::AMF_NODE, hostname);
        let new_clm_node = source.clm_node.rename_segment(rdn::CLM_NODE, hostname);

        let collector = FootprintCollector::new(&self.store);
        let footprint = collector.collect_for_scale_out(&source)?;
        let node_groups = collector.resolver().node_groups_containing(&source.amf_node);

        let nonce = self.options.nonce_for_run();
        let rewriter = IdentityRewriter::new(hostname, new_node.clone(), nonce.as_str())
            .with_fingerprint_len(self.options.fingerprint_len);

        let mut bundle = ChangeBundle::new();
        let mut created = Vec::new();
        for collected in footprint.into_ordered() {
            if !collected.class().is_some_and(|c| c.is_cloneable()) {
                debug!("Skipping {} ({})", collected.dn, collected.class_name);
                continue;
            }
            let mut object = self.store.get(&collected.dn, Scope::Config)?;
            prepare_for_write(&mut object);
            rewriter.rewrite(&mut object);

            let (object, parent) = into_create(object)?;
            if self.options.echo_objects {
                ui::print_object(&object);
            }
            created.push(object.dn.clone());
            bundle.create(object, parent)?;
        }

        for group in &node_groups {
            bundle.modify_add(group.dn.clone(), attr::NG_NODE_LIST, new_node.as_str())?;
        }

        bundle.apply(&mut self.store)?;
        info!("Scaling out done: {} operations committed", bundle.len());

        let mut admin_failures = 0;
        self.admin_best_effort(
            AdminAction::amf(AdminOperation::UnlockInstantiation, &new_node),
            &mut admin_failures,
        )
        .await;
        self.admin_best_effort(
            AdminAction::amf(AdminOperation::Unlock, &new_node),
            &mut admin_failures,
        )
        .await;

        Ok(ScaleOutOutcome::Scaled(ScaleOutReport {
            hostname: hostname.to_string(),
            template: template.to_string(),
            new_node,
            new_clm_node,
            created,
            node_groups: node_groups.into_iter().map(|g| g.dn).collect(),
            operations: bundle.operations().to_vec(),
            admin_failures,
            nonce,
        }))
    }
}
