//! Graphviz DOT output for aggregated profiles
//!
//! Emits one node directive per method in traversal order and one edge
//! directive per distinct (caller, callee) pair. Layout is left to Graphviz.

use crate::aggregator::{aggregate, MethodTable};
use crate::config::DotConfig;
use crate::error::{ProfileError, Result};
use crate::invocation::Profile;
use crate::label::{edge_font_size, escape_quoted, node_font_size, FontConfig, LabelRenderer};
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::Path;

const GRAPH_START_DIRECTIVE: &str = "digraph profile {";
const GRAPH_END_DIRECTIVE: &str = "}";

/// DOT document writer bound to one label strategy
pub struct GraphWriter {
    renderer: Box<dyn LabelRenderer>,
    font: FontConfig,
}

impl GraphWriter {
    pub fn new(renderer: Box<dyn LabelRenderer>, font: FontConfig) -> Self {
        Self { renderer, font }
    }

    /// Writer using the renderer and font selected by `config`
    pub fn from_config(config: &DotConfig) -> Self {
        Self::new(config.label_renderer.renderer(), config.font())
    }

    /// Write the complete DOT document for `table`
    pub fn write_graph<W: Write>(&self, table: &MethodTable, out: &mut W) -> io::Result<()> {
        out.write_all(self.render(table).as_bytes())
    }

    /// Render the complete DOT document for `table`
    pub fn render(&self, table: &MethodTable) -> String {
        let font_name = escape_quoted(&self.font.name);
        let mut dot = String::with_capacity(256 + table.len() * 512);

        dot.push_str(GRAPH_START_DIRECTIVE);
        dot.push('\n');
        dot.push_str(&format!(
            "\tnode [fontname=\"{}\", shape=\"{}\"];\n",
            font_name,
            self.renderer.node_shape()
        ));
        dot.push_str(&format!(
            "\tedge [fontname=\"{}\", fontsize=\"{}\"];\n",
            font_name,
            edge_font_size(self.font.base_size)
        ));
        dot.push('\n');

        let top = table.top_level_total_ns();
        for summary in table {
            dot.push_str(&format!(
                "\tnode_{} [label={}, fontsize=\"{}\"];\n",
                summary.serial,
                self.renderer.render_node(summary, top, &self.font),
                node_font_size(summary, top, &self.font)
            ));
        }

        dot.push('\n');
        let edges = Self::push_edges(table, &mut dot);
        dot.push_str(GRAPH_END_DIRECTIVE);
        dot.push('\n');

        tracing::debug!(nodes = table.len(), edges, "rendered DOT graph");
        dot
    }

    /// Append every distinct edge once, returning how many were emitted
    fn push_edges(table: &MethodTable, dot: &mut String) -> usize {
        let mut printed: HashSet<(u64, u64)> = HashSet::new();

        for summary in table {
            let serial = summary.serial;

            if !summary.is_root() {
                for &caller in &summary.callers {
                    if printed.insert((caller, serial)) {
                        push_edge(dot, caller, serial, table.edge_calls(caller, serial));
                    }
                }
            }

            for &callee in &summary.callees {
                if printed.insert((serial, callee)) {
                    push_edge(dot, serial, callee, table.edge_calls(serial, callee));
                }
            }
        }

        printed.len()
    }
}

fn push_edge(dot: &mut String, caller: u64, callee: u64, calls: u64) {
    dot.push_str(&format!(
        "\tnode_{} -> node_{} [label=\"{}\"];\n",
        caller, callee, calls
    ));
}

/// Aggregate and render a profile to DOT text
pub fn render_profile(profile: &Profile, config: &DotConfig) -> Result<String> {
    config.validate()?;
    let table = aggregate(profile)?;
    Ok(GraphWriter::from_config(config).render(&table))
}

/// Temporary output file created with the same umask-governed mode as
/// `File::create`, so the persisted graph is readable like any other output
fn output_tempfile(dir: &Path) -> io::Result<tempfile::NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".dotprof-").suffix(".gv.tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// Aggregate a profile and write its DOT graph to `path`
///
/// The document is written to a temporary file next to `path` and only
/// moved into place once fully flushed; on failure nothing is left behind.
pub fn write_profile_file<P: AsRef<Path>>(
    profile: &Profile,
    config: &DotConfig,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    config.validate()?;
    let table = aggregate(profile)?;
    let writer = GraphWriter::from_config(config);

    let sink_error = |source: io::Error| ProfileError::Sink {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = output_tempfile(dir).map_err(sink_error)?;

    {
        let mut out = io::BufWriter::new(tmp.as_file());
        writer.write_graph(&table, &mut out).map_err(sink_error)?;
        out.flush().map_err(sink_error)?;
    }
    tmp.as_file().sync_all().map_err(sink_error)?;
    tmp.persist(path).map_err(|e| sink_error(e.error))?;

    tracing::info!(path = %path.display(), methods = table.len(), "graph written");
    Ok(())
}
