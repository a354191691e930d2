//! Change bundle: an all-or-nothing batch of store mutations
//!
//! Operations are only queued here; nothing reaches the store until
//! `apply`. The bundle never reorders: creates must be queued parent first,
//! deletes child first. Getting that wrong surfaces as a rejected commit.

use std::fmt;

use super::dn::Dn;
use super::object::ConfigObject;
use crate::error::{BundleError, StoreError};

/// One queued mutation
#[derive(Debug, Clone, PartialEq)]
pub enum BundleOp {
    Create { object: ConfigObject, parent: Dn },
    Delete { dn: Dn },
    ModifyAdd { dn: Dn, attr: String, value: String },
    ModifyDelete { dn: Dn, attr: String, value: String },
}

impl BundleOp {
    /// DN the operation acts on
    pub fn target(&self) -> Dn {
        match self {
            Self::Create { object, parent } => match object.get(&object.rdn_attribute) {
                Some(rdn) => Dn::compose(rdn, parent),
                None => object.target_dn().clone(),
            },
            Self::Delete { dn } | Self::ModifyAdd { dn, .. } | Self::ModifyDelete { dn, .. } => {
                dn.clone()
            }
        }
    }
}

impl fmt::Display for BundleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { .. } => write!(f, "create {}", self.target()),
            Self::Delete { dn } => write!(f, "delete {}", dn),
            Self::ModifyAdd { dn, attr, value } => write!(f, "modify {} {} += {}", dn, attr, value),
            Self::ModifyDelete { dn, attr, value } => {
                write!(f, "modify {} {} -= {}", dn, attr, value)
            }
        }
    }
}

/// Anything that can take a batch of operations atomically
pub trait BundleTarget {
    /// Apply all operations or none of them
    fn commit(&mut self, ops: &[BundleOp]) -> Result<(), StoreError>;
}

/// Lifecycle of a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleState {
    Initialized,
    OperationsQueued,
    Applied,
    Failed,
}

impl fmt::Display for BundleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialized => "initialized",
            Self::OperationsQueued => "queued",
            Self::Applied => "applied",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Ordered queue of pending operations
#[derive(Debug)]
pub struct ChangeBundle {
    ops: Vec<BundleOp>,
    state: BundleState,
}

impl Default for ChangeBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBundle {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            state: BundleState::Initialized,
        }
    }

    pub fn state(&self) -> BundleState {
        self.state
    }

    pub fn operations(&self) -> &[BundleOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn create(&mut self, object: ConfigObject, parent: Dn) -> Result<(), BundleError> {
        self.push(BundleOp::Create { object, parent })
    }

    pub fn delete(&mut self, dn: Dn) -> Result<(), BundleError> {
        self.push(BundleOp::Delete { dn })
    }

    pub fn modify_add(
        &mut self,
        dn: Dn,
        attr: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), BundleError> {
        self.push(BundleOp::ModifyAdd {
            dn,
            attr: attr.into(),
            value: value.into(),
        })
    }

    pub fn modify_delete(
        &mut self,
        dn: Dn,
        attr: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), BundleError> {
        self.push(BundleOp::ModifyDelete {
            dn,
            attr: attr.into(),
            value: value.into(),
        })
    }

    /// Submit the whole queue as one commit.
    ///
    /// On rejection the bundle moves to `Failed` and the target is unchanged.
    pub fn apply<T: BundleTarget + ?Sized>(&mut self, target: &mut T) -> Result<(), BundleError> {
        self.ensure_open()?;
        match target.commit(&self.ops) {
            Ok(()) => {
                self.state = BundleState::Applied;
                Ok(())
            }
            Err(e) => {
                self.state = BundleState::Failed;
                Err(BundleError::Commit(e))
            }
        }
    }

    fn push(&mut self, op: BundleOp) -> Result<(), BundleError> {
        self.ensure_open()?;
        self.ops.push(op);
        self.state = BundleState::OperationsQueued;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), BundleError> {
        match self.state {
            BundleState::Applied | BundleState::Failed => Err(BundleError::InvalidState {
                state: self.state.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::object::EntityClass;

    #[derive(Default)]
    struct Recorder {
        committed: Vec<BundleOp>,
        reject: bool,
    }

    impl BundleTarget for Recorder {
        fn commit(&mut self, ops: &[BundleOp]) -> Result<(), StoreError> {
            if self.reject {
                return Err(StoreError::CommitRejected {
                    reason: "rejected".to_string(),
                });
            }
            self.committed.extend_from_slice(ops);
            Ok(())
        }
    }

    #[test]
    fn test_queue_then_apply() {
        let mut bundle = ChangeBundle::new();
        assert_eq!(bundle.state(), BundleState::Initialized);

        bundle.delete(Dn::from("safSu=SU1,safSg=SG1,safApp=A")).unwrap();
        bundle
            .modify_delete(Dn::from("safAmfNodeGroup=All,safAmfCluster=c"), "saAmfNGNodeList", "n1")
            .unwrap();
        assert_eq!(bundle.state(), BundleState::OperationsQueued);

        let mut target = Recorder::default();
        bundle.apply(&mut target).unwrap();
        assert_eq!(bundle.state(), BundleState::Applied);
        assert_eq!(target.committed.len(), 2);
    }

    #[test]
    fn test_no_queueing_after_apply() {
        let mut bundle = ChangeBundle::new();
        bundle.apply(&mut Recorder::default()).unwrap();

        let err = bundle.delete(Dn::from("safApp=A")).unwrap_err();
        assert!(matches!(err, BundleError::InvalidState { .. }));
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_failed_commit_closes_bundle() {
        let mut bundle = ChangeBundle::new();
        bundle.delete(Dn::from("safApp=A")).unwrap();

        let mut target = Recorder {
            reject: true,
            ..Default::default()
        };
        let err = bundle.apply(&mut target).unwrap_err();
        assert!(matches!(err, BundleError::Commit(StoreError::CommitRejected { .. })));
        assert_eq!(bundle.state(), BundleState::Failed);
        assert!(target.committed.is_empty());
        assert!(bundle.apply(&mut target).is_err());
    }

    #[test]
    fn test_create_target_uses_rdn_attribute() {
        let object =
            ConfigObject::new(EntityClass::ServiceUnit, "safSu=SU1,safSg=SG1,safApp=A", "safSu");
        let op = BundleOp::Create {
            object,
            parent: Dn::from("safSg=SG1,safApp=A"),
        };
        assert_eq!(op.target().as_str(), "safSu=SU1,safSg=SG1,safApp=A");
        assert_eq!(op.to_string(), "create safSu=SU1,safSg=SG1,safApp=A");
    }
}
