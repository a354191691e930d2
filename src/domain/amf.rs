//! AMF / CLM vocabulary: class names, attribute names and enumerations
//!
//! Numeric values match the middleware's `SaAmf*` enumerations so they can be
//! written back to the store verbatim.

/// Attribute names read or rewritten by the scale operations
pub mod attr {
    pub const NODE_CLM_NODE: &str = "saAmfNodeClmNode";
    pub const NODE_ADMIN_STATE: &str = "saAmfNodeAdminState";
    pub const SU_HOSTED_BY_NODE: &str = "saAmfSUHostedByNode";
    pub const SU_HOST_NODE_OR_NODE_GROUP: &str = "saAmfSUHostNodeOrNodeGroup";
    pub const SU_ADMIN_STATE: &str = "saAmfSUAdminState";
    pub const SU_TYPE: &str = "saAmfSUType";
    pub const SUT_PROVIDES_SVC_TYPES: &str = "saAmfSutProvidesSvcTypes";
    pub const SG_TYPE: &str = "saAmfSGType";
    pub const SGT_REDUNDANCY_MODEL: &str = "saAmfSgtRedundancyModel";
    pub const SI_PROTECTED_BY_SG: &str = "saAmfSIProtectedbySG";
    pub const SI_SVC_TYPE: &str = "saAmfSvcType";
    pub const NG_NODE_LIST: &str = "saAmfNGNodeList";

    /// Bookkeeping attributes the store returns even in configuration scope.
    /// They must not be written back on create.
    pub const IMM_ADMIN_OWNER_NAME: &str = "SaImmAttrAdminOwnerName";
    pub const IMM_CLASS_NAME: &str = "SaImmAttrClassName";
    pub const IMM_IMPLEMENTER_NAME: &str = "SaImmAttrImplementerName";

    pub const IMM_BOOKKEEPING: [&str; 3] =
        [IMM_ADMIN_OWNER_NAME, IMM_CLASS_NAME, IMM_IMPLEMENTER_NAME];
}

/// RDN attribute names that carry node identities or clone-hashed identities
pub mod rdn {
    pub const CLM_NODE: &str = "safNode";
    pub const AMF_NODE: &str = "safAmfNode";
    pub const SERVICE_UNIT: &str = "safSu";
    pub const SERVICE_INSTANCE: &str = "safSi";
}

/// Redundancy model of a service group type (`saAmfSgtRedundancyModel`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedundancyModel {
    TwoN,
    NPlusM,
    NWay,
    NWayActive,
    NoRedundancy,
}

impl RedundancyModel {
    /// The models whose service units can be moved between nodes
    pub const SCALABLE: [RedundancyModel; 3] = [
        RedundancyModel::TwoN,
        RedundancyModel::NWayActive,
        RedundancyModel::NoRedundancy,
    ];

    pub fn from_value(value: &str) -> Option<Self> {
        match value.trim().parse::<u32>().ok()? {
            1 => Some(Self::TwoN),
            2 => Some(Self::NPlusM),
            3 => Some(Self::NWay),
            4 => Some(Self::NWayActive),
            5 => Some(Self::NoRedundancy),
            _ => None,
        }
    }

    pub fn value(&self) -> u32 {
        match self {
            Self::TwoN => 1,
            Self::NPlusM => 2,
            Self::NWay => 3,
            Self::NWayActive => 4,
            Self::NoRedundancy => 5,
        }
    }

    pub fn is_scalable(&self) -> bool {
        Self::SCALABLE.contains(self)
    }
}

/// Administrative state attribute values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminState {
    Unlocked,
    Locked,
    LockedInstantiation,
}

impl AdminState {
    pub fn value(&self) -> u32 {
        match self {
            Self::Unlocked => 1,
            Self::Locked => 2,
            Self::LockedInstantiation => 3,
        }
    }
}

/// Administrative operations invoked through `amf-adm`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOperation {
    Unlock,
    Lock,
    LockInstantiation,
    UnlockInstantiation,
}

impl AdminOperation {
    /// Verb understood by the `amf-adm` tool
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Unlock => "unlock",
            Self::Lock => "lock",
            Self::LockInstantiation => "lock-in",
            Self::UnlockInstantiation => "unlock-in",
        }
    }
}

/// CLM node admin operation that stops the middleware daemon on the node
pub const CLM_ACTION_OPERATION_ID: u32 = 5;
pub const CLM_ACTION_STOP_PARAM: &str = "saClmAction:SA_STRING_T:stop";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redundancy_model_values() {
        assert_eq!(RedundancyModel::from_value("1"), Some(RedundancyModel::TwoN));
        assert_eq!(
            RedundancyModel::from_value(" 5 "),
            Some(RedundancyModel::NoRedundancy)
        );
        assert_eq!(RedundancyModel::from_value("9"), None);
        assert_eq!(RedundancyModel::NWayActive.value(), 4);
    }

    #[test]
    fn test_only_three_models_scale() {
        assert!(RedundancyModel::TwoN.is_scalable());
        assert!(RedundancyModel::NWayActive.is_scalable());
        assert!(RedundancyModel::NoRedundancy.is_scalable());
        assert!(!RedundancyModel::NPlusM.is_scalable());
        assert!(!RedundancyModel::NWay.is_scalable());
    }

    #[test]
    fn test_admin_operation_verbs() {
        assert_eq!(AdminOperation::LockInstantiation.verb(), "lock-in");
        assert_eq!(AdminOperation::UnlockInstantiation.verb(), "unlock-in");
    }

    #[test]
    fn test_admin_state_values() {
        assert_eq!(AdminState::LockedInstantiation.value(), 3);
        assert_eq!(AdminState::Unlocked.value(), 1);
    }
}
