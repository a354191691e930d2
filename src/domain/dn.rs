//! Distinguished name model
//!
//! A DN is an ordered list of `attr=value` segments, most specific first,
//! separated by commas. Values may carry a backslash-escaped comma
//! (`safVersion=1\,safCsType=X`), so segment boundaries are found by a
//! scanner that skips escaped characters instead of a plain `split(',')`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DnError;

/// Classes whose RDN values are known to embed a second, differently escaped
/// DN (component CS types, supported CS types). For these the RDN ends at the
/// second comma.
fn anomalous_rdn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"safC.*Type=").expect("static DN pattern"))
}

/// Hierarchical distinguished name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dn(String);

impl Dn {
    /// Parse and validate a DN: non-empty, every segment shaped `attr=value`
    pub fn parse(raw: &str) -> Result<Self, DnError> {
        if raw.is_empty() {
            return Err(DnError::malformed(raw, "empty DN"));
        }
        for segment in split_segments(raw) {
            match segment.split_once('=') {
                Some((attr, _)) if !attr.is_empty() => {}
                _ => {
                    return Err(DnError::malformed(
                        raw,
                        format!("segment '{}' is not attr=value", segment),
                    ))
                }
            }
        }
        Ok(Self(raw.to_string()))
    }

    /// Join an RDN onto a parent DN
    pub fn compose(rdn: &str, parent: &Dn) -> Self {
        Self(format!("{},{}", rdn, parent.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into RDN and parent DN.
    ///
    /// Fails with `Malformed` for single-segment DNs.
    pub fn split(&self) -> Result<(&str, Dn), DnError> {
        let cut = if self.is_anomalous() {
            // Known quirk: the RDN spans up to the second raw comma,
            // whatever the escaping says.
            self.0
                .match_indices(',')
                .nth(1)
                .map(|(idx, _)| idx)
        } else {
            first_unescaped_comma(&self.0)
        };

        match cut {
            Some(idx) if idx + 1 < self.0.len() => {
                Ok((&self.0[..idx], Dn(self.0[idx + 1..].to_string())))
            }
            _ => Err(DnError::malformed(&self.0, "DN has no parent")),
        }
    }

    /// Leaf segment
    pub fn rdn(&self) -> Result<&str, DnError> {
        match self.split() {
            Ok((rdn, _)) => Ok(rdn),
            // A root DN is its own RDN
            Err(_) if !self.0.is_empty() => Ok(self.0.as_str()),
            Err(e) => Err(e),
        }
    }

    pub fn parent(&self) -> Result<Dn, DnError> {
        self.split().map(|(_, parent)| parent)
    }

    /// Value part of the first segment (`safNode=SC-1,...` gives `SC-1`)
    pub fn first_value(&self) -> Option<&str> {
        split_segments(&self.0)
            .first()
            .and_then(|segment| segment.split_once('='))
            .map(|(_, value)| value)
    }

    /// Replace the value of the first segment named `attr`.
    ///
    /// Returns the DN unchanged when no segment carries that attribute.
    pub fn rename_segment(&self, attr: &str, new_value: &str) -> Dn {
        let mut renamed = false;
        self.rewrite_segments(|seg_attr, _| {
            if !renamed && seg_attr == attr {
                renamed = true;
                Some(new_value.to_string())
            } else {
                None
            }
        })
    }

    /// Rebuild the DN, letting `f` substitute the value of any segment.
    ///
    /// `f` receives `(attr, value)` and returns the replacement value, or
    /// `None` to keep the segment as is.
    pub fn rewrite_segments<F>(&self, mut f: F) -> Dn
    where
        F: FnMut(&str, &str) -> Option<String>,
    {
        let rebuilt: Vec<String> = split_segments(&self.0)
            .into_iter()
            .map(|segment| match segment.split_once('=') {
                Some((attr, value)) => match f(attr, value) {
                    Some(new_value) => format!("{}={}", attr, new_value),
                    None => segment.to_string(),
                },
                None => segment.to_string(),
            })
            .collect();
        Dn(rebuilt.join(","))
    }

    /// Substring containment, used where the store tools only ever did a
    /// textual search. `nodeA` is "contained" in a list naming `nodeAB`.
    pub fn contains_best_effort(haystack: &str, needle: &str) -> bool {
        haystack.contains(needle)
    }

    fn is_anomalous(&self) -> bool {
        self.0.contains('\\') && anomalous_rdn_pattern().is_match(&self.0)
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Dn {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for Dn {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for Dn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn first_unescaped_comma(raw: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in raw.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ',' => return Some(idx),
            _ => {}
        }
    }
    None
}

fn split_segments(raw: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = raw;
    while let Some(idx) = first_unescaped_comma(rest) {
        segments.push(&rest[..idx]);
        rest = &rest[idx + 1..];
    }
    if !rest.is_empty() {
        segments.push(rest);
    }
    segments
}

/// Split a DN into `(rdn, parent)` strings for a store create call
pub fn split_rdn_and_parent(dn: &Dn) -> Result<(String, Dn), DnError> {
    let (rdn, parent) = dn.split()?;
    Ok((rdn.to_string(), parent))
}
