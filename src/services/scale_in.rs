//! Scale-in: remove a node's configuration from the cluster
//!
//! Lock the node, lock and delete its service units, stop the middleware on
//! it, drop its no-redundancy service instances, leave its node groups and
//! finally delete both node identities. All store changes commit together.

use tracing::info;

use super::collector::FootprintCollector;
use super::scale_service::ScaleService;
use super::topology::{NodeIdentity, TopologyResolver};
use crate::domain::amf::{attr, AdminOperation};
use crate::domain::bundle::{BundleOp, ChangeBundle};
use crate::domain::dn::Dn;
use crate::error::ScaleError;
use crate::infrastructure::admin::{AdminAction, AdminInvoker};
use crate::infrastructure::store::{ConfigStore, Scope};

/// Outcome of a committed scale-in
#[derive(Debug, Clone)]
pub struct ScaleInReport {
    pub node: NodeIdentity,
    pub service_units: Vec<Dn>,
    pub service_instances: Vec<Dn>,
    pub node_groups: Vec<Dn>,
    /// Operations committed, in order
    pub operations: Vec<BundleOp>,
    /// Admin actions that failed (non-fatal)
    pub admin_failures: usize,
}

impl<S: ConfigStore, A: AdminInvoker> ScaleService<S, A> {
    /// Remove all configuration belonging to `hostname`
    pub async fn scale_in(&mut self, hostname: &str) -> Result<ScaleInReport, ScaleError> {
        info!("Scaling in: {}", hostname);
        let mut admin_failures = 0;

        let node = TopologyResolver::new(&self.store).find_node(hostname)?;
        // Both identities must exist before anything is touched
        self.store.get(&node.clm_node, Scope::All)?;
        self.store.get(&node.amf_node, Scope::All)?;

        info!("lock/lock-in {} {}", node.clm_node, node.amf_node);
        self.admin_best_effort(
            AdminAction::amf(AdminOperation::Lock, &node.clm_node),
            &mut admin_failures,
        )
        .await;
        self.admin_best_effort(
            AdminAction::amf(AdminOperation::Lock, &node.amf_node),
            &mut admin_failures,
        )
        .await;
        self.admin_best_effort(
            AdminAction::amf(AdminOperation::LockInstantiation, &node.amf_node),
            &mut admin_failures,
        )
        .await;

        let removal = FootprintCollector::new(&self.store).collect_for_scale_in(&node)?;
        let mut bundle = ChangeBundle::new();

        for su in &removal.service_units {
            self.admin_best_effort(
                AdminAction::amf(AdminOperation::Lock, &su.dn),
                &mut admin_failures,
            )
            .await;
            self.admin_best_effort(
                AdminAction::amf(AdminOperation::LockInstantiation, &su.dn),
                &mut admin_failures,
            )
            .await;
            bundle.delete(su.dn.clone())?;
        }

        info!("Stop middleware on {}", hostname);
        self.admin_best_effort(AdminAction::stop_daemon(&node.clm_node), &mut admin_failures)
            .await;

        for removable in &removal.service_instances {
            for csi in &removable.csis {
                bundle.delete(csi.dn.clone())?;
            }
            bundle.delete(removable.service_instance.dn.clone())?;
        }

        info!("Update node groups");
        for group in &removal.node_groups {
            bundle.modify_delete(group.dn.clone(), attr::NG_NODE_LIST, node.amf_node.as_str())?;
        }

        bundle.delete(node.amf_node.clone())?;
        bundle.delete(node.clm_node.clone())?;

        bundle.apply(&mut self.store)?;
        info!("Scaling in done: {} operations committed", bundle.len());

        Ok(ScaleInReport {
            service_units: removal.service_units.iter().map(|o| o.dn.clone()).collect(),
            service_instances: removal
                .service_instances
                .iter()
                .map(|r| r.service_instance.dn.clone())
                .collect(),
            node_groups: removal.node_groups.iter().map(|o| o.dn.clone()).collect(),
            operations: bundle.operations().to_vec(),
            admin_failures,
            node,
        })
    }
}
