//! Subtree collector - gathers a node's scalable footprint
//!
//! For scale-out, everything that has to be cloned, in creation order.
//! For scale-in, everything that has to go, with the conservative guards on
//! service instances (no active assignment, owning app collected in the
//! same pass).

use tracing::{debug, info};

use super::topology::{NodeIdentity, TopologyResolver};
use crate::domain::amf::RedundancyModel;
use crate::domain::dn::Dn;
use crate::domain::object::{ConfigObject, EntityClass};
use crate::error::ScaleError;
use crate::infrastructure::store::ConfigStore;

/// A template node's footprint, grouped by kind
#[derive(Debug, Clone)]
pub struct Footprint {
    pub amf_node: ConfigObject,
    pub clm_node: ConfigObject,
    pub service_units: Vec<ConfigObject>,
    pub service_instances: Vec<ConfigObject>,
    pub csis: Vec<ConfigObject>,
    pub components: Vec<ConfigObject>,
    pub comp_cs_types: Vec<ConfigObject>,
    pub sw_bundles: Vec<ConfigObject>,
    pub healthchecks: Vec<ConfigObject>,
    pub csi_attributes: Vec<ConfigObject>,
}

impl Footprint {
    /// Creation order: the two node identities first, every parent before
    /// its children
    pub fn into_ordered(self) -> Vec<ConfigObject> {
        let mut ordered = vec![self.amf_node, self.clm_node];
        ordered.extend(self.service_units);
        ordered.extend(self.service_instances);
        ordered.extend(self.csis);
        ordered.extend(self.components);
        ordered.extend(self.comp_cs_types);
        ordered.extend(self.sw_bundles);
        ordered.extend(self.healthchecks);
        ordered.extend(self.csi_attributes);
        ordered
    }

    pub fn object_count(&self) -> usize {
        2 + self.service_units.len()
            + self.service_instances.len()
            + self.csis.len()
            + self.components.len()
            + self.comp_cs_types.len()
            + self.sw_bundles.len()
            + self.healthchecks.len()
            + self.csi_attributes.len()
    }
}

/// A no-redundancy service instance cleared for removal, with its CSIs
#[derive(Debug, Clone)]
pub struct RemovableInstance {
    pub service_instance: ConfigObject,
    pub csis: Vec<ConfigObject>,
}

/// What a scale-in removes
#[derive(Debug, Clone)]
pub struct RemovalSet {
    pub service_units: Vec<ConfigObject>,
    pub service_instances: Vec<RemovableInstance>,
    pub node_groups: Vec<ConfigObject>,
}

/// Walks relationships from a node to its footprint
pub struct FootprintCollector<'a, S: ConfigStore + ?Sized> {
    store: &'a S,
    resolver: TopologyResolver<'a, S>,
}

impl<'a, S: ConfigStore + ?Sized> FootprintCollector<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            resolver: TopologyResolver::new(store),
        }
    }

    pub fn resolver(&self) -> &TopologyResolver<'a, S> {
        &self.resolver
    }

    /// Everything a clone of `node` needs, breadth first
    pub fn collect_for_scale_out(&self, node: &NodeIdentity) -> Result<Footprint, ScaleError> {
        let resolver = &self.resolver;

        let service_units =
            resolver.service_units_of_node(&node.amf_node, &RedundancyModel::SCALABLE)?;
        let components = resolver.children_of(EntityClass::Component, &service_units);
        let healthchecks = resolver.children_of(EntityClass::Healthcheck, &components);
        let comp_cs_types = resolver.children_of(EntityClass::CompCsType, &components);
        let service_instances = resolver
            .services_and_apps_for(&service_units, RedundancyModel::NoRedundancy)?
            .service_instances;
        let csis = resolver.children_of(EntityClass::Csi, &service_instances);
        let csi_attributes = resolver.children_of(EntityClass::CsiAttribute, &csis);
        let sw_bundles: Vec<ConfigObject> = self
            .store
            .instances(EntityClass::NodeSwBundle, Some(&node.amf_node))
            .collect();

        let amf_node = self.store.lookup(&node.amf_node)?;
        let clm_node = self.store.lookup(&node.clm_node)?;

        let footprint = Footprint {
            amf_node,
            clm_node,
            service_units,
            service_instances,
            csis,
            components,
            comp_cs_types,
            sw_bundles,
            healthchecks,
            csi_attributes,
        };
        info!("Collected {} objects from {}", footprint.object_count(), node.hostname);
        Ok(footprint)
    }

    /// Everything a scale-in of `node` removes
    pub fn collect_for_scale_in(&self, node: &NodeIdentity) -> Result<RemovalSet, ScaleError> {
        let resolver = &self.resolver;

        let service_units =
            resolver.service_units_of_node(&node.amf_node, &RedundancyModel::SCALABLE)?;
        let matched =
            resolver.services_and_apps_for(&service_units, RedundancyModel::NoRedundancy)?;

        let mut service_instances = Vec::new();
        for si in matched.service_instances {
            if !self.is_removable(&si, &matched.apps) {
                debug!("Keeping {}", si.dn);
                continue;
            }
            let csis = resolver.children_of(EntityClass::Csi, std::slice::from_ref(&si));
            service_instances.push(RemovableInstance {
                service_instance: si,
                csis,
            });
        }

        let node_groups = resolver.node_groups_containing(&node.amf_node);

        Ok(RemovalSet {
            service_units,
            service_instances,
            node_groups,
        })
    }

    /// An SI goes only if nothing is assigned to it and it belongs to one of
    /// the applications collected alongside it
    fn is_removable(&self, si: &ConfigObject, apps: &[Dn]) -> bool {
        if self.resolver.has_assignment(&si.dn) {
            return false;
        }
        let mentions_app = apps
            .iter()
            .any(|app| Dn::contains_best_effort(si.dn.as_str(), app.as_str()));
        let owned_by_app = si.dn.parent().is_ok_and(|app| apps.contains(&app));
        mentions_app && owned_by_app
    }
}
