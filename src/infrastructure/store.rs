//! Store accessor contract
//!
//! The scale services only need three things from the configuration store:
//! point reads, class-scoped iteration and one atomic commit. Any backend
//! implementing `ConfigStore` can be passed in explicitly.

use crate::domain::bundle::BundleTarget;
use crate::domain::dn::Dn;
use crate::domain::object::{ConfigObject, EntityClass};
use crate::error::StoreError;

/// Which attributes a read returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Configuration attributes only (plus the store's bookkeeping attributes)
    Config,
    /// Configuration and runtime attributes
    #[default]
    All,
}

/// Read access plus atomic commit
pub trait ConfigStore: BundleTarget {
    /// Read one object; `NotFound` if nothing lives at `dn`
    fn get(&self, dn: &Dn, scope: Scope) -> Result<ConfigObject, StoreError>;

    /// Lazily yield all instances of `class_name`, optionally restricted to
    /// `root` and its descendants. Order is the store's, stable for one pass;
    /// calling again restarts the iteration.
    fn iterate<'a>(
        &'a self,
        class_name: &'a str,
        root: Option<&'a Dn>,
    ) -> Box<dyn Iterator<Item = ConfigObject> + 'a>;

    /// Typed convenience over `iterate`
    fn instances<'a>(
        &'a self,
        class: EntityClass,
        root: Option<&'a Dn>,
    ) -> Box<dyn Iterator<Item = ConfigObject> + 'a> {
        self.iterate(class.class_name(), root)
    }

    /// Read a DN needed to derive another fact; failures become `LookupFailure`
    fn lookup(&self, dn: &Dn) -> Result<ConfigObject, StoreError> {
        self.get(dn, Scope::All)
            .map_err(|e| StoreError::lookup(dn.as_str(), e))
    }
}
