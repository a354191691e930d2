//! Configuration object model
//!
//! One store entry: class, DN, RDN attribute and a multi-valued attribute map.
//! Objects are plain values; the store hands out copies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dn::Dn;

/// Store classes the scale operations know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    /// AMF node (service-node identity)
    Node,
    /// CLM node (membership-node identity)
    ClmNode,
    ServiceUnit,
    ServiceInstance,
    Csi,
    CsiAttribute,
    Component,
    CompCsType,
    Healthcheck,
    NodeSwBundle,
    ServiceGroup,
    SgType,
    SuType,
    NodeGroup,
    SiAssignment,
}

impl EntityClass {
    /// Classes a scale-out is allowed to create
    pub const CLONEABLE: [EntityClass; 10] = [
        EntityClass::Node,
        EntityClass::ClmNode,
        EntityClass::ServiceUnit,
        EntityClass::ServiceInstance,
        EntityClass::Csi,
        EntityClass::Component,
        EntityClass::CompCsType,
        EntityClass::NodeSwBundle,
        EntityClass::Healthcheck,
        EntityClass::CsiAttribute,
    ];

    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Node => "SaAmfNode",
            Self::ClmNode => "SaClmNode",
            Self::ServiceUnit => "SaAmfSU",
            Self::ServiceInstance => "SaAmfSI",
            Self::Csi => "SaAmfCSI",
            Self::CsiAttribute => "SaAmfCSIAttribute",
            Self::Component => "SaAmfComp",
            Self::CompCsType => "SaAmfCompCsType",
            Self::Healthcheck => "SaAmfHealthcheck",
            Self::NodeSwBundle => "SaAmfNodeSwBundle",
            Self::ServiceGroup => "SaAmfSG",
            Self::SgType => "SaAmfSGType",
            Self::SuType => "SaAmfSUType",
            Self::NodeGroup => "SaAmfNodeGroup",
            Self::SiAssignment => "SaAmfSIAssignment",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        match name {
            "SaAmfNode" => Some(Self::Node),
            "SaClmNode" => Some(Self::ClmNode),
            "SaAmfSU" => Some(Self::ServiceUnit),
            "SaAmfSI" => Some(Self::ServiceInstance),
            "SaAmfCSI" => Some(Self::Csi),
            "SaAmfCSIAttribute" => Some(Self::CsiAttribute),
            "SaAmfComp" => Some(Self::Component),
            "SaAmfCompCsType" => Some(Self::CompCsType),
            "SaAmfHealthcheck" => Some(Self::Healthcheck),
            "SaAmfNodeSwBundle" => Some(Self::NodeSwBundle),
            "SaAmfSG" => Some(Self::ServiceGroup),
            "SaAmfSGType" => Some(Self::SgType),
            "SaAmfSUType" => Some(Self::SuType),
            "SaAmfNodeGroup" => Some(Self::NodeGroup),
            "SaAmfSIAssignment" => Some(Self::SiAssignment),
            _ => None,
        }
    }

    pub fn is_cloneable(&self) -> bool {
        Self::CLONEABLE.contains(self)
    }
}

/// In-memory copy of one store object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigObject {
    pub class_name: String,
    pub dn: Dn,
    pub rdn_attribute: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, Vec<String>>,
    /// Rewritten identity while a clone is being prepared; never persisted
    #[serde(skip)]
    pub new_dn: Option<Dn>,
}

impl ConfigObject {
    /// Create an object whose RDN attribute holds the DN's leaf segment
    pub fn new(class: EntityClass, dn: impl Into<Dn>, rdn_attribute: &str) -> Self {
        Self::with_class_name(class.class_name(), dn, rdn_attribute)
    }

    pub fn with_class_name(class_name: &str, dn: impl Into<Dn>, rdn_attribute: &str) -> Self {
        let dn = dn.into();
        let mut attrs = BTreeMap::new();
        if let Ok(rdn) = dn.rdn() {
            attrs.insert(rdn_attribute.to_string(), vec![rdn.to_string()]);
        }
        Self {
            class_name: class_name.to_string(),
            dn,
            rdn_attribute: rdn_attribute.to_string(),
            attrs,
            new_dn: None,
        }
    }

    /// Builder: set a single-valued attribute
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Builder: set a multi-valued attribute
    pub fn with_values<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.attrs
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn class(&self) -> Option<EntityClass> {
        EntityClass::from_class_name(&self.class_name)
    }

    pub fn is(&self, class: EntityClass) -> bool {
        self.class_name == class.class_name()
    }

    /// First value of an attribute
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// First value of an attribute, read as a DN
    pub fn get_dn(&self, name: &str) -> Option<Dn> {
        self.get(name).map(Dn::from)
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.attrs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.insert(name.to_string(), vec![value.into()]);
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.attrs.remove(name)
    }

    /// The DN this object will be written under
    pub fn target_dn(&self) -> &Dn {
        self.new_dn.as_ref().unwrap_or(&self.dn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_rdn_attribute() {
        let su = ConfigObject::new(
            EntityClass::ServiceUnit,
            "safSu=SU1,safSg=SG1,safApp=App1",
            "safSu",
        );
        assert_eq!(su.get("safSu"), Some("safSu=SU1"));
        assert!(su.is(EntityClass::ServiceUnit));
        assert_eq!(su.class(), Some(EntityClass::ServiceUnit));
    }

    #[test]
    fn test_multi_valued_attributes() {
        let ng = ConfigObject::new(
            EntityClass::NodeGroup,
            "safAmfNodeGroup=All,safAmfCluster=c",
            "safAmfNodeGroup",
        )
        .with_values("saAmfNGNodeList", ["n1", "n2"]);
        assert_eq!(ng.values("saAmfNGNodeList").len(), 2);
        assert_eq!(ng.get("saAmfNGNodeList"), Some("n1"));
        assert!(ng.values("missing").is_empty());
    }

    #[test]
    fn test_new_dn_is_not_serialized() {
        let mut node = ConfigObject::new(
            EntityClass::Node,
            "safAmfNode=nodeA,safAmfCluster=myAmfCluster",
            "safAmfNode",
        );
        node.new_dn = Some(Dn::from("safAmfNode=nodeB,safAmfCluster=myAmfCluster"));
        assert_eq!(node.target_dn().as_str(), "safAmfNode=nodeB,safAmfCluster=myAmfCluster");

        let json = serde_json::to_string(&node).unwrap();
        assert!(!json.contains("nodeB"));
    }

    #[test]
    fn test_unknown_class() {
        let obj = ConfigObject::with_class_name("SaAmfCluster", "safAmfCluster=c", "safAmfCluster");
        assert_eq!(obj.class(), None);
        assert!(!EntityClass::ServiceGroup.is_cloneable());
        assert!(EntityClass::CsiAttribute.is_cloneable());
    }
}
