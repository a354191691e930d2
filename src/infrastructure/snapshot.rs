//! File-backed configuration store
//!
//! Holds a snapshot of the IMM tree as a YAML list of objects, with
//! configuration and runtime attributes kept apart so configuration-scope
//! reads can leave the runtime ones out. Commits are applied to a scratch
//! copy and swapped in only when every operation succeeds.
//!
//! ```yaml
//! objects:
//!   - class_name: SaAmfSU
//!     dn: safSu=SU1,safSg=SG1,safApp=App1
//!     rdn_attribute: safSu
//!     attrs:
//!       safSu: [safSu=SU1]
//!       saAmfSUType: [safVersion=1,safSuType=T1]
//!     runtime:
//!       saAmfSUHostedByNode: [safAmfNode=nodeA,safAmfCluster=myAmfCluster]
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::store::{ConfigStore, Scope};
use crate::domain::bundle::{BundleOp, BundleTarget};
use crate::domain::dn::Dn;
use crate::domain::object::ConfigObject;
use crate::error::StoreError;

/// One object as held in the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub class_name: String,
    pub dn: Dn,
    pub rdn_attribute: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub runtime: BTreeMap<String, Vec<String>>,
}

impl StoredObject {
    /// Builder: add a runtime attribute
    pub fn with_runtime(mut self, name: &str, value: impl Into<String>) -> Self {
        self.runtime.insert(name.to_string(), vec![value.into()]);
        self
    }

    fn view(&self, scope: Scope) -> ConfigObject {
        let mut attrs = self.attrs.clone();
        if scope == Scope::All {
            for (name, values) in &self.runtime {
                attrs.insert(name.clone(), values.clone());
            }
        }
        ConfigObject {
            class_name: self.class_name.clone(),
            dn: self.dn.clone(),
            rdn_attribute: self.rdn_attribute.clone(),
            attrs,
            new_dn: None,
        }
    }

    fn is_under(&self, root: &Dn) -> bool {
        is_same_or_descendant(&self.dn, root)
    }
}

impl From<ConfigObject> for StoredObject {
    fn from(object: ConfigObject) -> Self {
        Self {
            class_name: object.class_name,
            dn: object.dn,
            rdn_attribute: object.rdn_attribute,
            attrs: object.attrs,
            runtime: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    objects: Vec<StoredObject>,
}

/// Configuration store backed by an in-memory snapshot
#[derive(Debug, Default)]
pub struct SnapshotStore {
    objects: Vec<StoredObject>,
    path: Option<PathBuf>,
}

impl SnapshotStore {
    pub fn from_objects(objects: impl IntoIterator<Item = StoredObject>) -> Self {
        Self {
            objects: objects.into_iter().collect(),
            path: None,
        }
    }

    /// Load a snapshot file; commits are written back to the same path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file: SnapshotFile = serde_yaml::from_str(&content).map_err(|e| StoreError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        for object in &file.objects {
            Dn::parse(object.dn.as_str()).map_err(|e| StoreError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        info!("Loaded {} objects from {}", file.objects.len(), path.display());
        Ok(Self {
            objects: file.objects,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, dn: &Dn) -> bool {
        self.objects.iter().any(|o| &o.dn == dn)
    }

    pub fn insert(&mut self, object: StoredObject) {
        self.objects.push(object);
    }

    /// Set a runtime attribute, as the middleware would; false if `dn` is unknown
    pub fn set_runtime(&mut self, dn: &Dn, name: &str, value: impl Into<String>) -> bool {
        match self.objects.iter_mut().find(|o| &o.dn == dn) {
            Some(object) => {
                object.runtime.insert(name.to_string(), vec![value.into()]);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn write_to(&self, path: &Path) -> Result<(), StoreError> {
        write_snapshot(path, &self.objects)
    }

    /// Forget the backing file; later commits only change the in-memory copy
    pub fn detached(mut self) -> Self {
        self.path = None;
        self
    }
}

/// Write objects to `path` atomically (temp file in the same directory, then rename)
fn write_snapshot(path: &Path, objects: &[StoredObject]) -> Result<(), StoreError> {
    let io_err = |e: &dyn std::fmt::Display| StoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let file = SnapshotFile {
        objects: objects.to_vec(),
    };
    let yaml = serde_yaml::to_string(&file).map_err(|e| io_err(&e))?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| io_err(&e))?;
    tmp.write_all(yaml.as_bytes()).map_err(|e| io_err(&e))?;
    tmp.persist(path).map_err(|e| io_err(&e.error))?;

    info!("Saved {} objects to {}", objects.len(), path.display());
    Ok(())
}

impl ConfigStore for SnapshotStore {
    fn get(&self, dn: &Dn, scope: Scope) -> Result<ConfigObject, StoreError> {
        self.objects
            .iter()
            .find(|o| &o.dn == dn)
            .map(|o| o.view(scope))
            .ok_or_else(|| StoreError::NotFound {
                dn: dn.to_string(),
            })
    }

    fn iterate<'a>(
        &'a self,
        class_name: &'a str,
        root: Option<&'a Dn>,
    ) -> Box<dyn Iterator<Item = ConfigObject> + 'a> {
        Box::new(
            self.objects
                .iter()
                .filter(move |o| o.class_name == class_name)
                .filter(move |o| root.map_or(true, |r| o.is_under(r)))
                .map(|o| o.view(Scope::All)),
        )
    }
}

impl BundleTarget for SnapshotStore {
    fn commit(&mut self, ops: &[BundleOp]) -> Result<(), StoreError> {
        let mut scratch = self.objects.clone();
        for op in ops {
            apply_op(&mut scratch, op).map_err(|reason| StoreError::CommitRejected {
                reason: format!("{}: {}", op, reason),
            })?;
        }
        // A file-backed snapshot is on disk before the commit counts
        if let Some(path) = self.path.as_deref() {
            write_snapshot(path, &scratch)?;
        }
        self.objects = scratch;
        info!("Committed {} operations", ops.len());
        Ok(())
    }
}

fn is_same_or_descendant(dn: &Dn, root: &Dn) -> bool {
    let dn = dn.as_str();
    let root = root.as_str();
    dn == root
        || (dn.len() > root.len()
            && dn.ends_with(root)
            && dn.as_bytes()[dn.len() - root.len() - 1] == b',')
}

fn apply_op(objects: &mut Vec<StoredObject>, op: &BundleOp) -> Result<(), String> {
    match op {
        BundleOp::Create { object, parent } => {
            let rdn = object
                .get(&object.rdn_attribute)
                .ok_or_else(|| format!("RDN attribute {} not set", object.rdn_attribute))?;
            let dn = Dn::compose(rdn, parent);
            if !objects.iter().any(|o| &o.dn == parent) {
                return Err(format!("parent {} does not exist", parent));
            }
            if objects.iter().any(|o| o.dn == dn) {
                return Err("object already exists".to_string());
            }
            let mut stored = StoredObject::from(object.clone());
            stored.dn = dn;
            objects.push(stored);
        }
        BundleOp::Delete { dn } => {
            if !objects.iter().any(|o| &o.dn == dn) {
                return Err("object does not exist".to_string());
            }
            // Deleting an object removes its whole subtree
            objects.retain(|o| !o.is_under(dn));
        }
        BundleOp::ModifyAdd { dn, attr, value } => {
            let target = find_mut(objects, dn)?;
            target
                .attrs
                .entry(attr.clone())
                .or_default()
                .push(value.clone());
        }
        BundleOp::ModifyDelete { dn, attr, value } => {
            let target = find_mut(objects, dn)?;
            match target.attrs.get_mut(attr) {
                Some(values) if values.contains(value) => values.retain(|v| v != value),
                _ => debug!("{} has no {} value {}, nothing to delete", dn, attr, value),
            }
        }
    }
    Ok(())
}

fn find_mut<'a>(objects: &'a mut [StoredObject], dn: &Dn) -> Result<&'a mut StoredObject, String> {
    objects
        .iter_mut()
        .find(|o| &o.dn == dn)
        .ok_or_else(|| "object does not exist".to_string())
}
