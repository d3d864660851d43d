//! Per-method aggregation of an invocation tree
//!
//! Walks the tree once, depth-first, and folds every invocation into a
//! [`MethodSummary`] keyed by method serial. Summaries keep the order in
//! which their serials were first reached; the graph writer emits nodes in
//! that order, so two runs over the same tree produce identical output.
//!
//! Features:
//! - Total and self time per method (recursion counted once for total time)
//! - Caller and callee sets in first-encountered order
//! - Per-edge call counts keyed on the ordered (caller, callee) pair

use crate::error::{ProfileError, Result};
use crate::invocation::{Invocation, MethodNames, Profile, ROOT_NAME, ROOT_SERIAL};
use std::collections::HashMap;

/// Aggregated statistics for one method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSummary {
    /// Method serial
    pub serial: u64,
    /// Qualified name, `<package>::<class>#<method>` by convention
    pub name: String,
    /// Time in this method and everything it called (nanoseconds)
    pub total_time_ns: u64,
    /// Time in this method alone (nanoseconds)
    pub self_time_ns: u64,
    /// Number of invocations
    pub total_calls: u64,
    /// Distinct caller serials, first-encountered order
    pub callers: Vec<u64>,
    /// Distinct callee serials, first-encountered order
    pub callees: Vec<u64>,
}

impl MethodSummary {
    fn new(serial: u64, name: String) -> Self {
        Self {
            serial,
            name,
            total_time_ns: 0,
            self_time_ns: 0,
            total_calls: 0,
            callers: Vec::new(),
            callees: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.serial == ROOT_SERIAL
    }
}

/// Ordered method summaries plus per-edge call counts
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    summaries: Vec<MethodSummary>,
    index: HashMap<u64, usize>,
    edge_calls: HashMap<(u64, u64), u64>,
    top_level_total_ns: u64,
}

impl MethodTable {
    /// Summaries in traversal order
    pub fn summaries(&self) -> &[MethodSummary] {
        &self.summaries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MethodSummary> {
        self.summaries.iter()
    }

    pub fn get(&self, serial: u64) -> Option<&MethodSummary> {
        self.index.get(&serial).map(|&i| &self.summaries[i])
    }

    /// Number of times `caller` invoked `callee` directly
    pub fn edge_calls(&self, caller: u64, callee: u64) -> u64 {
        self.edge_calls.get(&(caller, callee)).copied().unwrap_or(0)
    }

    /// Number of distinct (caller, callee) pairs
    pub fn edge_count(&self) -> usize {
        self.edge_calls.len()
    }

    /// Total time of the tree root, the denominator for all percentages
    pub fn top_level_total_ns(&self) -> u64 {
        self.top_level_total_ns
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

impl<'a> IntoIterator for &'a MethodTable {
    type Item = &'a MethodSummary;
    type IntoIter = std::slice::Iter<'a, MethodSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.summaries.iter()
    }
}

/// Aggregate a whole profile into a [`MethodTable`]
pub fn aggregate(profile: &Profile) -> Result<MethodTable> {
    MethodAggregator::new(profile.names()).run(&profile.root)
}

enum Step<'a> {
    Enter {
        node: &'a Invocation,
        parent: Option<u64>,
    },
    Exit(u64),
}

/// Single-pass folder over an invocation tree
pub struct MethodAggregator<'a> {
    names: &'a MethodNames,
    table: MethodTable,
    /// Open invocations per serial, used to count recursive total time once
    active: HashMap<u64, usize>,
}

impl<'a> MethodAggregator<'a> {
    pub fn new(names: &'a MethodNames) -> Self {
        Self {
            names,
            table: MethodTable::default(),
            active: HashMap::new(),
        }
    }

    /// Fold the tree rooted at `root`, consuming the aggregator
    pub fn run(mut self, root: &Invocation) -> Result<MethodTable> {
        let mut stack = vec![Step::Enter {
            node: root,
            parent: None,
        }];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter { node, parent } => {
                    self.visit(node, parent)?;
                    stack.push(Step::Exit(node.serial));
                    stack.extend(node.children.iter().rev().map(|child| Step::Enter {
                        node: child,
                        parent: Some(node.serial),
                    }));
                }
                Step::Exit(serial) => {
                    if let Some(depth) = self.active.get_mut(&serial) {
                        *depth -= 1;
                    }
                }
            }
        }

        self.table.top_level_total_ns = self
            .table
            .get(root.serial)
            .map(|s| s.total_time_ns)
            .unwrap_or(0);

        tracing::debug!(
            methods = self.table.len(),
            edges = self.table.edge_count(),
            top_level_total_ns = self.table.top_level_total_ns,
            "aggregated invocation tree"
        );

        Ok(self.table)
    }

    fn visit(&mut self, node: &Invocation, parent: Option<u64>) -> Result<()> {
        let serial = node.serial;

        if node.duration_ns < 0 {
            return Err(ProfileError::malformed(
                serial,
                format!("negative duration ({} ns)", node.duration_ns),
            ));
        }
        if serial == ROOT_SERIAL && parent.is_some() {
            return Err(ProfileError::malformed(
                serial,
                "serial 0 is reserved for the root invocation",
            ));
        }

        let children_ns = node.children_duration_ns();
        let duration_ns = if parent.is_none() && serial == ROOT_SERIAL && node.duration_ns == 0 {
            // Synthetic root without its own timing spans its children.
            children_ns.max(0)
        } else {
            node.duration_ns
        };
        let self_ns = duration_ns.saturating_sub(children_ns);
        if self_ns < 0 {
            return Err(ProfileError::malformed(
                serial,
                format!(
                    "children durations ({} ns) exceed invocation duration ({} ns)",
                    children_ns, duration_ns
                ),
            ));
        }

        let index = self.summary_index(serial)?;
        let depth = self.active.entry(serial).or_insert(0);
        let outermost = *depth == 0;
        *depth += 1;

        let summary = &mut self.table.summaries[index];
        summary.total_calls += 1;
        summary.self_time_ns = summary.self_time_ns.saturating_add(self_ns as u64);
        if outermost {
            summary.total_time_ns = summary.total_time_ns.saturating_add(duration_ns as u64);
        }

        if let Some(caller) = parent {
            self.record_edge(caller, serial);
        }
        Ok(())
    }

    fn summary_index(&mut self, serial: u64) -> Result<usize> {
        if let Some(&index) = self.table.index.get(&serial) {
            return Ok(index);
        }

        let name = match self.names.get(serial) {
            Some(name) => name.to_string(),
            None if serial == ROOT_SERIAL => ROOT_NAME.to_string(),
            None => {
                return Err(ProfileError::malformed(
                    serial,
                    "no method name registered for serial",
                ))
            }
        };

        let index = self.table.summaries.len();
        self.table.summaries.push(MethodSummary::new(serial, name));
        self.table.index.insert(serial, index);
        Ok(index)
    }

    fn record_edge(&mut self, caller: u64, callee: u64) {
        let count = self.table.edge_calls.entry((caller, callee)).or_insert(0);
        *count += 1;
        if *count > 1 {
            return;
        }

        // First sighting of this pair: both endpoints already have summaries.
        let callee_index = self.table.index[&callee];
        self.table.summaries[callee_index].callers.push(caller);
        let caller_index = self.table.index[&caller];
        self.table.summaries[caller_index].callees.push(callee);
    }
}
