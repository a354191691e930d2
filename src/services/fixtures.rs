//! Test fixtures: a small two-node cluster in an in-memory snapshot store

use std::path::Path;
use std::sync::Mutex;

use crate::domain::amf::attr;
use crate::domain::dn::Dn;
use crate::domain::object::{ConfigObject, EntityClass};
use crate::error::AdminError;
use crate::infrastructure::admin::{AdminAction, AdminInvoker};
use crate::infrastructure::snapshot::{SnapshotStore, StoredObject};
use crate::infrastructure::store::ConfigStore;

pub const AMF_CLUSTER: &str = "safAmfCluster=myAmfCluster";
pub const CLM_CLUSTER: &str = "safCluster=myClmCluster";
pub const AMF_NODE_A: &str = "safAmfNode=nodeA,safAmfCluster=myAmfCluster";
pub const CLM_NODE_A: &str = "safNode=nodeA,safCluster=myClmCluster";
pub const AMF_NODE_C: &str = "safAmfNode=nodeC,safAmfCluster=myAmfCluster";
pub const CLM_NODE_C: &str = "safNode=nodeC,safCluster=myClmCluster";

pub const APP_2N: &str = "safApp=App2N";
pub const APP_NORED: &str = "safApp=AppNoRed";
pub const SU_2N: &str = "safSu=SU1,safSg=SG2N,safApp=App2N";
pub const SU_NWA: &str = "safSu=SU1,safSg=SGNWA,safApp=AppNWA";
pub const SU_NORED: &str = "safSu=SU1,safSg=SGNoRed,safApp=AppNoRed";
pub const SU_NPM: &str = "safSu=SU1,safSg=SGNpm,safApp=App2N";
pub const SU_2N_ON_C: &str = "safSu=SU2,safSg=SG2N,safApp=App2N";
pub const COMP_2N: &str = "safComp=C1,safSu=SU1,safSg=SG2N,safApp=App2N";
pub const HC_2N: &str = "safHealthcheckKey=HC1,safComp=C1,safSu=SU1,safSg=SG2N,safApp=App2N";
pub const CS_TYPE_2N: &str =
    r"safSupportedCsType=safVersion=1\,safCsType=CsT1,safComp=C1,safSu=SU1,safSg=SG2N,safApp=App2N";
pub const SI_NORED: &str = "safSi=SI1,safApp=AppNoRed";
pub const SI_OTHER_TYPE: &str = "safSi=SI2,safApp=AppNoRed";
pub const APP_OTHER: &str = "safApp=Other";
pub const SI_FOREIGN: &str = "safSi=SI9,safApp=Other";
pub const CSI_NORED: &str = "safCsi=CSI1,safSi=SI1,safApp=AppNoRed";
pub const CSI_ATTR_NORED: &str = "safCsiAttr=attr1,safCsi=CSI1,safSi=SI1,safApp=AppNoRed";
pub const SW_BUNDLE_A: &str =
    "safInstalledSwBundle=safSmfBundle=B1,safAmfNode=nodeA,safAmfCluster=myAmfCluster";
pub const NG_ALL: &str = "safAmfNodeGroup=AllNodes,safAmfCluster=myAmfCluster";
pub const NG_A: &str = "safAmfNodeGroup=GroupA,safAmfCluster=myAmfCluster";
pub const NG_C: &str = "safAmfNodeGroup=GroupC,safAmfCluster=myAmfCluster";

/// Object carrying the bookkeeping attributes a real config read returns
fn obj(class: EntityClass, dn: &str, rdn_attr: &str) -> ConfigObject {
    ConfigObject::new(class, dn, rdn_attr)
        .with_attr(attr::IMM_CLASS_NAME, class.class_name())
        .with_attr(attr::IMM_ADMIN_OWNER_NAME, "safAmfService")
        .with_attr(attr::IMM_IMPLEMENTER_NAME, "safAmfService")
}

fn other(class_name: &str, dn: &str, rdn_attr: &str) -> ConfigObject {
    ConfigObject::with_class_name(class_name, dn, rdn_attr)
}

fn node_pair(host: &str) -> [StoredObject; 2] {
    let amf = format!("safAmfNode={},{}", host, AMF_CLUSTER);
    let clm = format!("safNode={},{}", host, CLM_CLUSTER);
    [
        obj(EntityClass::Node, &amf, "safAmfNode")
            .with_attr(attr::NODE_CLM_NODE, clm.clone())
            .with_attr(attr::NODE_ADMIN_STATE, "1")
            .into(),
        obj(EntityClass::ClmNode, &clm, "safNode").into(),
    ]
}

fn sg(dn: &str, sg_type: &str) -> StoredObject {
    obj(EntityClass::ServiceGroup, dn, "safSg")
        .with_attr(attr::SG_TYPE, sg_type)
        .into()
}

fn sg_type(dn: &str, model: u32) -> StoredObject {
    obj(EntityClass::SgType, dn, "safSgType")
        .with_attr(attr::SGT_REDUNDANCY_MODEL, model.to_string())
        .into()
}

fn su(dn: &str, su_type: &str, node: &str) -> StoredObject {
    StoredObject::from(
        obj(EntityClass::ServiceUnit, dn, "safSu")
            .with_attr(attr::SU_TYPE, su_type)
            .with_attr(attr::SU_HOST_NODE_OR_NODE_GROUP, node)
            .with_attr(attr::SU_ADMIN_STATE, "1"),
    )
    .with_runtime(attr::SU_HOSTED_BY_NODE, node)
}

fn si(dn: &str, protected_by: &str, svc_type: &str) -> StoredObject {
    obj(EntityClass::ServiceInstance, dn, "safSi")
        .with_attr(attr::SI_PROTECTED_BY_SG, protected_by)
        .with_attr(attr::SI_SVC_TYPE, svc_type)
        .into()
}

fn node_group(dn: &str, members: &[&str]) -> StoredObject {
    obj(EntityClass::NodeGroup, dn, "safAmfNodeGroup")
        .with_values(attr::NG_NODE_LIST, members.iter().copied())
        .into()
}

/// nodeA hosts a 2N, an N-way-active, a no-redundancy and an N+M unit;
/// nodeC hosts a second 2N unit.
pub fn cluster() -> SnapshotStore {
    let mut objects: Vec<StoredObject> = vec![
        other("SaAmfCluster", AMF_CLUSTER, "safAmfCluster").into(),
        other("SaClmCluster", CLM_CLUSTER, "safCluster").into(),
    ];
    objects.extend(node_pair("nodeA"));
    objects.extend(node_pair("nodeC"));

    objects.extend([
        sg_type("safSgType=T2N", 1),
        sg_type("safSgType=TNpm", 2),
        sg_type("safSgType=TNWA", 4),
        sg_type("safSgType=TNoRed", 5),
        obj(EntityClass::SuType, "safSuType=SuT2N", "safSuType")
            .with_values(attr::SUT_PROVIDES_SVC_TYPES, ["safSvcType=Svc2N"])
            .into(),
        obj(EntityClass::SuType, "safSuType=SuTNoRed", "safSuType")
            .with_values(attr::SUT_PROVIDES_SVC_TYPES, ["safSvcType=SvcNoRed"])
            .into(),
        other("SaAmfApplication", APP_2N, "safApp").into(),
        other("SaAmfApplication", "safApp=AppNWA", "safApp").into(),
        other("SaAmfApplication", APP_NORED, "safApp").into(),
        sg("safSg=SG2N,safApp=App2N", "safSgType=T2N"),
        sg("safSg=SGNpm,safApp=App2N", "safSgType=TNpm"),
        sg("safSg=SGNWA,safApp=AppNWA", "safSgType=TNWA"),
        sg("safSg=SGNoRed,safApp=AppNoRed", "safSgType=TNoRed"),
        su(SU_2N, "safSuType=SuT2N", AMF_NODE_A),
        su(SU_NWA, "safSuType=SuT2N", AMF_NODE_A),
        su(SU_NORED, "safSuType=SuTNoRed", AMF_NODE_A),
        su(SU_NPM, "safSuType=SuT2N", AMF_NODE_A),
        su(SU_2N_ON_C, "safSuType=SuT2N", AMF_NODE_C),
        obj(EntityClass::Component, COMP_2N, "safComp").into(),
        obj(EntityClass::Healthcheck, HC_2N, "safHealthcheckKey").into(),
        obj(EntityClass::CompCsType, CS_TYPE_2N, "safSupportedCsType").into(),
        si("safSi=SI1,safApp=App2N", "safSg=SG2N,safApp=App2N", "safSvcType=Svc2N"),
        si(SI_NORED, "safSg=SGNoRed,safApp=AppNoRed", "safSvcType=SvcNoRed"),
        si(SI_OTHER_TYPE, "safSg=SGNoRed,safApp=AppNoRed", "safSvcType=SvcOther"),
        obj(EntityClass::Csi, CSI_NORED, "safCsi").into(),
        obj(EntityClass::CsiAttribute, CSI_ATTR_NORED, "safCsiAttr").into(),
        obj(EntityClass::NodeSwBundle, SW_BUNDLE_A, "safInstalledSwBundle").into(),
        node_group(NG_ALL, &[AMF_NODE_A, AMF_NODE_C]),
        node_group(NG_A, &[AMF_NODE_A]),
        node_group(NG_C, &[AMF_NODE_C]),
    ]);

    SnapshotStore::from_objects(objects)
}

/// Write the cluster to `dir` and load it back as a file-backed store
pub fn cluster_on_disk(dir: &Path) -> SnapshotStore {
    let path = dir.join("imm-snapshot.yaml");
    cluster().write_to(&path).unwrap();
    SnapshotStore::load(&path).unwrap()
}

/// An application outside nodeA's units whose SI is still protected by the
/// no-redundancy group and served by the same service type
pub fn add_foreign_instance(store: &mut SnapshotStore) {
    store.insert(other("SaAmfApplication", APP_OTHER, "safApp").into());
    store.insert(si(SI_FOREIGN, "safSg=SGNoRed,safApp=AppNoRed", "safSvcType=SvcNoRed"));
}

/// Add a node pair hosting nothing and belonging to no node group
pub fn add_idle_node(store: &mut SnapshotStore, host: &str) {
    for object in node_pair(host) {
        store.insert(object);
    }
}

/// Fill in the runtime hosting attribute the middleware sets once a unit is
/// instantiated on its configured node
pub fn instantiate_units(store: &mut SnapshotStore) {
    let pending: Vec<(Dn, String)> = store
        .instances(EntityClass::ServiceUnit, None)
        .filter(|su| su.get(attr::SU_HOSTED_BY_NODE).is_none())
        .filter_map(|su| {
            let node = su.get(attr::SU_HOST_NODE_OR_NODE_GROUP)?.to_string();
            Some((su.dn, node))
        })
        .collect();
    for (dn, node) in pending {
        store.set_runtime(&dn, attr::SU_HOSTED_BY_NODE, node);
    }
}

/// Record an SI assignment for `si_dn` on the no-redundancy unit
pub fn assign(store: &mut SnapshotStore, si_dn: &str) {
    let dn = format!(r"safSISU=safSu=SU1\,safSg=SGNoRed\,safApp=AppNoRed,{}", si_dn);
    store.insert(other("SaAmfSIAssignment", &dn, "safSISU").into());
}

/// Captures admin actions instead of running them
#[derive(Debug, Default)]
pub struct RecordingInvoker {
    actions: Mutex<Vec<AdminAction>>,
    fail: bool,
}

impl RecordingInvoker {
    /// Every action is recorded, then reported as failed
    pub fn failing() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn actions(&self) -> Vec<AdminAction> {
        self.actions.lock().unwrap().clone()
    }
}

impl AdminInvoker for RecordingInvoker {
    async fn invoke(&self, action: &AdminAction) -> Result<i32, AdminError> {
        self.actions.lock().unwrap().push(action.clone());
        if self.fail {
            return Err(AdminError::NonZeroExit {
                command: action.to_string(),
                code: 1,
            });
        }
        Ok(0)
    }
}
