//! dotprof - method-call profiles rendered as Graphviz DOT call graphs
//!
//! This library aggregates a tree of timed invocations into per-method
//! summaries (total time, self time, call counts, caller/callee edges) and
//! writes them as a DOT document whose node labels scale with self time.
//!
//! ```
//! use dotprof::{config::DotConfig, dot_output::render_profile, recorder::Recorder};
//!
//! let mut recorder = Recorder::new();
//! recorder.measure("demo::App#main", |r| r.measure("demo::App#work", |_| ()));
//! let dot = render_profile(&recorder.finish(), &DotConfig::default()).unwrap();
//! assert!(dot.starts_with("digraph profile {"));
//! assert!(dot.contains("node_1 -> node_2 [label=\"1\"];"));
//! ```

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod dot_output;
pub mod error;
pub mod invocation;
pub mod label;
pub mod recorder;
pub mod workload;

pub use error::{ProfileError, Result};
