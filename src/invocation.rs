//! Invocation tree input model
//!
//! A [`Profile`] pairs the root of an invocation tree with the registry of
//! qualified method names. Trees come either from the in-process
//! [`Recorder`](crate::recorder::Recorder) or from a JSON document:
//!
//! ```
//! use dotprof::invocation::Profile;
//!
//! let json = r#"{
//!     "methods": { "1": "Object#work" },
//!     "root": { "serial": 0, "duration_ns": 1000, "children": [
//!         { "serial": 1, "duration_ns": 600 }
//!     ] }
//! }"#;
//! let profile = Profile::from_json_str(json).unwrap();
//! assert_eq!(profile.root.children.len(), 1);
//! assert_eq!(profile.names().get(1), Some("Object#work"));
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Serial reserved for the synthetic root invocation
pub const ROOT_SERIAL: u64 = 0;

/// Display name used for the synthetic root when none is registered
pub const ROOT_NAME: &str = "(top)";

/// One dynamic execution of a method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Method serial
    pub serial: u64,
    /// Wall-clock duration in nanoseconds (signed so bad input can be reported)
    #[serde(default)]
    pub duration_ns: i64,
    /// Nested invocations in the order they happened
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Invocation>,
}

impl Invocation {
    pub fn new(serial: u64, duration_ns: i64, children: Vec<Invocation>) -> Self {
        Self {
            serial,
            duration_ns,
            children,
        }
    }

    /// Leaf invocation without children
    pub fn leaf(serial: u64, duration_ns: i64) -> Self {
        Self::new(serial, duration_ns, Vec::new())
    }

    /// Sum of the direct children's durations
    pub fn children_duration_ns(&self) -> i64 {
        self.children
            .iter()
            .fold(0i64, |acc, c| acc.saturating_add(c.duration_ns))
    }

    /// Number of invocations in this subtree, including this one
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            total += 1;
            pending.extend(node.children.iter());
        }
        total
    }
}

/// Serial to qualified method name registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodNames {
    names: BTreeMap<u64, String>,
}

impl MethodNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, serial: u64, name: impl Into<String>) {
        self.names.insert(serial, name.into());
    }

    pub fn get(&self, serial: u64) -> Option<&str> {
        self.names.get(&serial).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u64, S)> for MethodNames {
    fn from_iter<I: IntoIterator<Item = (u64, S)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

/// A recorded profile: invocation tree plus method names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub methods: MethodNames,
    pub root: Invocation,
}

impl Profile {
    pub fn new(root: Invocation, names: MethodNames) -> Self {
        Self {
            methods: names,
            root,
        }
    }

    /// Method name registry
    pub fn names(&self) -> &MethodNames {
        &self.methods
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
