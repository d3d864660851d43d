//! Node label rendering for DOT output
//!
//! Two strategies share the same pre-processing: the qualified name is split
//! into package and class-and-method parts, and every node is scaled by the
//! square root of its self-time fraction so cold methods stay legible while
//! the hottest one stands out.

use crate::aggregator::MethodSummary;

/// Separator between package path and `Class#method`
pub const PACKAGE_SEPARATOR: &str = "::";

/// Edge labels are drawn slightly smaller than the base font
const EDGE_FONT_RATIO: f64 = 0.85;

/// Extra points given to the class-and-method line of table titles
const TITLE_EMPHASIS_PT: u32 = 4;

/// Font parameters applied to the whole graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontConfig {
    pub name: String,
    pub base_size: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            name: "Menlo".to_string(),
            base_size: 14,
        }
    }
}

/// Strategy that turns one method summary into a DOT label
pub trait LabelRenderer {
    /// Full label value, delimiters included (`"..."` or `<...>`)
    fn render_node(&self, summary: &MethodSummary, top_level_total_ns: u64, font: &FontConfig)
        -> String;

    /// Shape keyword for the global node directive
    fn node_shape(&self) -> &'static str;
}

/// Split `pkg::Class#method` on the last separator
///
/// # Example
/// ```
/// use dotprof::label::split_qualified_name;
///
/// assert_eq!(split_qualified_name("a::b::C#d"), ("a::b", "C#d"));
/// assert_eq!(split_qualified_name("C#d"), ("", "C#d"));
/// ```
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    name.rsplit_once(PACKAGE_SEPARATOR).unwrap_or(("", name))
}

/// Escape `&`, `<` and `>` for HTML-like DOT labels
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text for a double-quoted DOT string
pub fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `0.5 + 2 * sqrt(self / top)`, or `0.5` when there is no top-level time
pub fn size_modifier(self_time_ns: u64, top_level_total_ns: u64) -> f64 {
    if top_level_total_ns == 0 {
        return 0.5;
    }
    0.5 + 2.0 * (self_time_ns as f64 / top_level_total_ns as f64).sqrt()
}

pub fn scaled_font_size(base_size: u32, modifier: f64) -> u32 {
    (base_size as f64 * modifier).round() as u32
}

pub fn edge_font_size(base_size: u32) -> u32 {
    (base_size as f64 * EDGE_FONT_RATIO).round() as u32
}

/// Node font size for a summary under the given font settings
pub fn node_font_size(summary: &MethodSummary, top_level_total_ns: u64, font: &FontConfig) -> u32 {
    scaled_font_size(
        font.base_size,
        size_modifier(summary.self_time_ns, top_level_total_ns),
    )
}

pub fn percentage(time_ns: u64, top_level_total_ns: u64) -> f64 {
    if top_level_total_ns == 0 {
        0.0
    } else {
        time_ns as f64 / top_level_total_ns as f64 * 100.0
    }
}

fn seconds(time_ns: u64) -> f64 {
    time_ns as f64 / 1_000_000_000.0
}

/// Single-line quoted label
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl LabelRenderer for PlainTextRenderer {
    fn render_node(&self, summary: &MethodSummary, top: u64, _font: &FontConfig) -> String {
        let (package, class_and_method) = split_qualified_name(&summary.name);

        let mut lines = Vec::with_capacity(5);
        if !package.is_empty() {
            lines.push(escape_quoted(package));
        }
        lines.push(escape_quoted(class_and_method));
        lines.push(format!(
            "total {:.3}s ({:.1}%)",
            seconds(summary.total_time_ns),
            percentage(summary.total_time_ns, top)
        ));
        lines.push(format!(
            "self {:.3}s ({:.1}%)",
            seconds(summary.self_time_ns),
            percentage(summary.self_time_ns, top)
        ));
        lines.push(format!("calls {}", summary.total_calls));

        format!("\"{}\"", lines.join("\\n"))
    }

    fn node_shape(&self) -> &'static str {
        "box"
    }
}

/// HTML-like two-row table label
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredTableRenderer;

impl StructuredTableRenderer {
    fn title(package: &str, class_and_method: &str, font_size: u32) -> String {
        let mut title = String::new();
        if !package.is_empty() {
            title.push_str(&format!(
                r#"<FONT POINT-SIZE="{}">{}</FONT><BR/>"#,
                font_size,
                escape_markup(package)
            ));
        }
        title.push_str(&format!(
            r#"<FONT POINT-SIZE="{}">{}</FONT><BR/>"#,
            font_size.saturating_add(TITLE_EMPHASIS_PT),
            escape_markup(class_and_method)
        ));
        title
    }

    fn metric_row(name: &str, value: &str) -> String {
        format!(r#"<TR><TD ALIGN="LEFT">{} </TD><TD ALIGN="RIGHT">{}</TD></TR>"#, name, value)
    }
}

impl LabelRenderer for StructuredTableRenderer {
    fn render_node(&self, summary: &MethodSummary, top: u64, font: &FontConfig) -> String {
        let (package, class_and_method) = split_qualified_name(&summary.name);
        let title = Self::title(package, class_and_method, node_font_size(summary, top, font));

        let metrics = [
            Self::metric_row(
                "total",
                &format!(
                    "{:.3}s ({:.1}%)",
                    seconds(summary.total_time_ns),
                    percentage(summary.total_time_ns, top)
                ),
            ),
            Self::metric_row(
                "self",
                &format!(
                    "{:.3}s ({:.1}%)",
                    seconds(summary.self_time_ns),
                    percentage(summary.self_time_ns, top)
                ),
            ),
            Self::metric_row("calls", &summary.total_calls.to_string()),
        ]
        .concat();

        format!(
            concat!(
                r#"<<TABLE BORDER="0" CELLBORDER="1" CELLSPACING="0" CELLPADDING="8">"#,
                r#"<TR><TD ALIGN="LEFT" BALIGN="LEFT">{}</TD></TR>"#,
                r#"<TR><TD><TABLE BORDER="0" CELLBORDER="0" CELLSPACING="0" CELLPADDING="0">"#,
                "{}",
                "</TABLE></TD></TR>",
                "</TABLE>>"
            ),
            title, metrics
        )
    }

    fn node_shape(&self) -> &'static str {
        "plaintext"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, total: u64, self_time: u64, calls: u64) -> MethodSummary {
        MethodSummary {
            serial: 1,
            name: name.to_string(),
            total_time_ns: total,
            self_time_ns: self_time,
            total_calls: calls,
            callers: vec![0],
            callees: Vec::new(),
        }
    }

    #[test]
    fn test_split_uses_last_separator() {
        assert_eq!(split_qualified_name("std::io::Write#flush"), ("std::io", "Write#flush"));
        assert_eq!(split_qualified_name("Kernel#puts"), ("", "Kernel#puts"));
        assert_eq!(split_qualified_name("::Top#m"), ("", "Top#m"));
    }

    #[test]
    fn test_escape_markup_no_double_escaping() {
        let escaped = escape_markup("Vec<T>#push&pop");
        assert_eq!(escaped, "Vec&lt;T&gt;#push&amp;pop");
        assert!(!escaped.contains("&amp;lt;"));
        assert!(!escaped.contains('<'));
    }

    #[test]
    fn test_escape_quoted() {
        assert_eq!(escape_quoted(r#"say "hi"\n"#), r#"say \"hi\"\\n"#);
    }

    #[test]
    fn test_size_modifier_bounds() {
        assert_eq!(size_modifier(0, 1_000), 0.5);
        assert_eq!(size_modifier(1_000, 1_000), 2.5);
        assert_eq!(size_modifier(250, 1_000), 1.5);
        assert_eq!(size_modifier(10, 0), 0.5);
    }

    #[test]
    fn test_font_sizes() {
        assert_eq!(edge_font_size(14), 12);
        assert_eq!(scaled_font_size(14, 0.5), 7);
        assert_eq!(scaled_font_size(14, 2.5), 35);
    }

    #[test]
    fn test_percentage_zero_top() {
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(250, 1_000), 25.0);
    }

    #[test]
    fn test_plain_text_label() {
        let s = summary("app::Worker#run", 600_000_000, 150_000_000, 3);
        let label = PlainTextRenderer.render_node(&s, 1_000_000_000, &FontConfig::default());
        assert_eq!(
            label,
            r#""app\nWorker#run\ntotal 0.600s (60.0%)\nself 0.150s (15.0%)\ncalls 3""#
        );
        assert!(!label.contains('\n'));
    }

    #[test]
    fn test_plain_text_label_without_package() {
        let s = summary("Kernel#puts", 10, 10, 1);
        let label = PlainTextRenderer.render_node(&s, 10, &FontConfig::default());
        assert!(label.starts_with(r#""Kernel#puts\ntotal"#));
    }

    #[test]
    fn test_table_label_structure() {
        let s = summary("app::Worker#run", 1_000_000_000, 250_000_000, 2);
        let label = StructuredTableRenderer.render_node(&s, 1_000_000_000, &FontConfig::default());

        assert!(label.starts_with("<<TABLE"));
        assert!(label.ends_with("</TABLE>>"));
        // modifier 1.5 -> 21pt package, 25pt class-and-method
        assert!(label.contains(r#"<FONT POINT-SIZE="21">app</FONT><BR/>"#));
        assert!(label.contains(r#"<FONT POINT-SIZE="25">Worker#run</FONT><BR/>"#));
        assert!(label.contains("1.000s (100.0%)"));
        assert!(label.contains("0.250s (25.0%)"));
        assert!(label.contains(r#"<TD ALIGN="RIGHT">2</TD>"#));
        assert!(!label.contains('\n'));
    }

    #[test]
    fn test_table_label_single_line_title() {
        let s = summary("Kernel#puts", 0, 0, 1);
        let label = StructuredTableRenderer.render_node(&s, 100, &FontConfig::default());
        assert_eq!(label.matches("<FONT").count(), 1);
        assert!(label.contains(r#"<FONT POINT-SIZE="11">Kernel#puts</FONT>"#));
    }

    #[test]
    fn test_table_label_escapes_markup() {
        let s = summary("core::Option<T>#map&then", 1, 1, 1);
        let label = StructuredTableRenderer.render_node(&s, 1, &FontConfig::default());
        assert!(label.contains("Option&lt;T&gt;#map&amp;then"));
        assert!(!label.contains("Option<T>"));
    }

    #[test]
    fn test_node_shapes() {
        assert_eq!(PlainTextRenderer.node_shape(), "box");
        assert_eq!(StructuredTableRenderer.node_shape(), "plaintext");
    }
}
