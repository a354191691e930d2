//! Topology resolver - derives cluster facts from the object graph
//!
//! Redundancy of a service unit, units hosted by a node, service instances
//! matched to units, and node-group membership. Everything here is read-only.

use tracing::debug;

use crate::domain::amf::{attr, RedundancyModel};
use crate::domain::dn::Dn;
use crate::domain::object::{ConfigObject, EntityClass};
use crate::error::{ScaleError, StoreError};
use crate::infrastructure::store::ConfigStore;

/// The two correlated identities of one cluster member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    pub hostname: String,
    /// Service-node (AMF) DN
    pub amf_node: Dn,
    /// Membership-node (CLM) DN
    pub clm_node: Dn,
}

/// Service instances matched to a set of units, plus the units' applications
#[derive(Debug, Clone, Default)]
pub struct MatchedServices {
    pub service_instances: Vec<ConfigObject>,
    /// Application DNs, first-seen order, no duplicates
    pub apps: Vec<Dn>,
}

/// Read-only queries over a store
pub struct TopologyResolver<'a, S: ConfigStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ConfigStore + ?Sized> TopologyResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Find the AMF and CLM node DNs for a host name.
    ///
    /// Matches on the first segment value of each AMF node's CLM node reference.
    pub fn find_node(&self, hostname: &str) -> Result<NodeIdentity, StoreError> {
        self.store
            .instances(EntityClass::Node, None)
            .find_map(|node| {
                let clm_node = node.get_dn(attr::NODE_CLM_NODE)?;
                (clm_node.first_value() == Some(hostname)).then(|| NodeIdentity {
                    hostname: hostname.to_string(),
                    amf_node: node.dn.clone(),
                    clm_node,
                })
            })
            .ok_or_else(|| StoreError::NodeNotFound {
                hostname: hostname.to_string(),
            })
    }

    /// Redundancy model of a service unit: SU -> SG -> SG type
    pub fn redundancy_of(&self, su_dn: &Dn) -> Result<RedundancyModel, ScaleError> {
        let sg_dn = su_dn.parent()?;
        let sg = self.store.lookup(&sg_dn)?;

        let sg_type_dn = sg.get_dn(attr::SG_TYPE).ok_or_else(|| StoreError::LookupFailure {
            dn: sg_dn.to_string(),
            reason: format!("{} not set", attr::SG_TYPE),
        })?;
        let sg_type = self.store.lookup(&sg_type_dn)?;

        let raw = sg_type.get(attr::SGT_REDUNDANCY_MODEL).unwrap_or_default();
        RedundancyModel::from_value(raw).ok_or_else(|| {
            StoreError::LookupFailure {
                dn: sg_type_dn.to_string(),
                reason: format!("unknown redundancy model '{}'", raw),
            }
            .into()
        })
    }

    /// Service units hosted by `amf_node` whose redundancy is in `allowed`
    pub fn service_units_of_node(
        &self,
        amf_node: &Dn,
        allowed: &[RedundancyModel],
    ) -> Result<Vec<ConfigObject>, ScaleError> {
        let mut units = Vec::new();
        for su in self.store.instances(EntityClass::ServiceUnit, None) {
            if su.get(attr::SU_HOSTED_BY_NODE) != Some(amf_node.as_str()) {
                continue;
            }
            if allowed.contains(&self.redundancy_of(&su.dn)?) {
                units.push(su);
            }
        }
        debug!("{} hosts {} scalable service units", amf_node, units.len());
        Ok(units)
    }

    /// True if any service unit is currently hosted on a node named `hostname`
    pub fn hosts_any_service_unit(&self, hostname: &str) -> bool {
        self.store
            .instances(EntityClass::ServiceUnit, None)
            .filter_map(|su| su.get_dn(attr::SU_HOSTED_BY_NODE))
            .any(|node| node.first_value() == Some(hostname))
    }

    /// Service instances protected by the groups of the units matching
    /// `model`, and served by a service type one of those units provides.
    pub fn services_and_apps_for(
        &self,
        service_units: &[ConfigObject],
        model: RedundancyModel,
    ) -> Result<MatchedServices, ScaleError> {
        let mut matched_units = Vec::new();
        let mut groups: Vec<Dn> = Vec::new();
        let mut apps: Vec<Dn> = Vec::new();

        for su in service_units {
            if self.redundancy_of(&su.dn)? != model {
                continue;
            }
            let sg = su.dn.parent()?;
            let app = sg.parent()?;
            matched_units.push(su);
            if !apps.contains(&app) {
                apps.push(app);
            }
            groups.push(sg);
        }

        let protected: Vec<ConfigObject> = self
            .store
            .instances(EntityClass::ServiceInstance, None)
            .filter(|si| {
                si.get_dn(attr::SI_PROTECTED_BY_SG)
                    .is_some_and(|sg| groups.contains(&sg))
            })
            .collect();

        let mut provided: Vec<String> = Vec::new();
        for su in &matched_units {
            let su_type_dn = su.get_dn(attr::SU_TYPE).ok_or_else(|| StoreError::LookupFailure {
                dn: su.dn.to_string(),
                reason: format!("{} not set", attr::SU_TYPE),
            })?;
            let su_type = self.store.lookup(&su_type_dn)?;
            provided.extend(su_type.values(attr::SUT_PROVIDES_SVC_TYPES).iter().cloned());
        }

        let service_instances = protected
            .into_iter()
            .filter(|si| {
                si.get(attr::SI_SVC_TYPE)
                    .is_some_and(|svc_type| provided.iter().any(|p| p == svc_type))
            })
            .collect();

        Ok(MatchedServices {
            service_instances,
            apps,
        })
    }

    /// Node groups whose member list mentions `amf_node`.
    ///
    /// Best-effort: a textual search over the concatenated member list, so a
    /// node whose DN is a prefix of another member's DN also matches.
    pub fn node_groups_containing(&self, amf_node: &Dn) -> Vec<ConfigObject> {
        self.store
            .instances(EntityClass::NodeGroup, None)
            .filter(|group| {
                let members = group.values(attr::NG_NODE_LIST).concat();
                Dn::contains_best_effort(&members, amf_node.as_str())
            })
            .collect()
    }

    /// True if any SI assignment DN mentions `si_dn` (best-effort containment)
    pub fn has_assignment(&self, si_dn: &Dn) -> bool {
        self.store
            .instances(EntityClass::SiAssignment, None)
            .any(|assignment| Dn::contains_best_effort(assignment.dn.as_str(), si_dn.as_str()))
    }

    /// Objects of `class` under any of `parents`, parent order preserved
    pub fn children_of(&self, class: EntityClass, parents: &[ConfigObject]) -> Vec<ConfigObject> {
        parents
            .iter()
            .flat_map(|parent| self.store.instances(class, Some(&parent.dn)))
            .collect()
    }
}
