//! Integration tests for call-graph aggregation and DOT rendering
//!
//! Exercises the public pipeline with small hand-built invocation trees.

use dotprof::aggregator::aggregate;
use dotprof::config::DotConfig;
use dotprof::dot_output::{render_profile, GraphWriter};
use dotprof::invocation::{Invocation, MethodNames, Profile};
use dotprof::ProfileError;

fn names() -> MethodNames {
    [
        (1, "app::Service#handle"),
        (2, "app::Repo#load"),
        (3, "std::fmt#format"),
    ]
    .into_iter()
    .collect()
}

fn edge_lines(dot: &str) -> Vec<String> {
    dot.lines()
        .filter(|l| l.contains(" -> "))
        .map(str::to_string)
        .collect()
}

fn node_lines(dot: &str) -> Vec<String> {
    dot.lines()
        .filter(|l| l.starts_with("\tnode_") && !l.contains(" -> "))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_two_children_of_root() {
    // Scenario: root (1ms) calls A (0.6ms) and B (0.4ms) once each
    let profile = Profile::new(
        Invocation::new(
            0,
            1_000_000,
            vec![Invocation::leaf(1, 600_000), Invocation::leaf(2, 400_000)],
        ),
        names(),
    );

    let dot = render_profile(&profile, &DotConfig::default()).unwrap();

    let nodes = node_lines(&dot);
    assert_eq!(nodes.len(), 3);
    assert!(nodes[1].starts_with("\tnode_1 "));
    assert!(nodes[2].starts_with("\tnode_2 "));
    assert_eq!(
        edge_lines(&dot),
        vec![
            "\tnode_0 -> node_1 [label=\"1\"];",
            "\tnode_0 -> node_2 [label=\"1\"];",
        ]
    );
}

#[test]
fn test_method_called_from_two_callers() {
    // Scenario: A invoked twice by root and once by B
    let profile = Profile::new(
        Invocation::new(
            0,
            1_000,
            vec![
                Invocation::leaf(1, 100),
                Invocation::new(2, 300, vec![Invocation::leaf(1, 100)]),
                Invocation::leaf(1, 100),
            ],
        ),
        names(),
    );

    let table = aggregate(&profile).unwrap();
    assert_eq!(table.get(1).unwrap().total_calls, 3);

    let dot = GraphWriter::from_config(&DotConfig::default()).render(&table);
    let edges = edge_lines(&dot);
    assert!(edges.contains(&"\tnode_0 -> node_1 [label=\"2\"];".to_string()));
    assert!(edges.contains(&"\tnode_2 -> node_1 [label=\"1\"];".to_string()));
    assert_eq!(edges.len(), 3);
}

#[test]
fn test_rendering_is_deterministic() {
    let profile = Profile::new(
        Invocation::new(
            0,
            0,
            vec![
                Invocation::new(
                    1,
                    500,
                    vec![
                        Invocation::new(2, 200, vec![Invocation::leaf(3, 50)]),
                        Invocation::leaf(3, 40),
                    ],
                ),
                Invocation::new(2, 300, vec![Invocation::leaf(1, 100)]),
            ],
        ),
        names(),
    );

    for config in [
        DotConfig::default(),
        DotConfig::default().with_renderer("simple").unwrap(),
    ] {
        let first = render_profile(&profile, &config).unwrap();
        let second = render_profile(&profile, &config).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_json_profile_renders_like_in_memory_profile() {
    let json = r#"{
        "methods": { "1": "app::Service#handle", "2": "app::Repo#load" },
        "root": { "serial": 0, "duration_ns": 900, "children": [
            { "serial": 1, "duration_ns": 800, "children": [
                { "serial": 2, "duration_ns": 500 }
            ] }
        ] }
    }"#;
    let from_json = Profile::from_json_str(json).unwrap();
    let in_memory = Profile::new(
        Invocation::new(
            0,
            900,
            vec![Invocation::new(1, 800, vec![Invocation::leaf(2, 500)])],
        ),
        [(1, "app::Service#handle"), (2, "app::Repo#load")]
            .into_iter()
            .collect(),
    );

    let config = DotConfig::default();
    assert_eq!(
        render_profile(&from_json, &config).unwrap(),
        render_profile(&in_memory, &config).unwrap()
    );
}

#[test]
fn test_simple_renderer_labels() {
    let profile = Profile::new(
        Invocation::new(0, 2_000_000_000, vec![Invocation::leaf(1, 500_000_000)]),
        names(),
    );
    let config = DotConfig::default().with_renderer("simple").unwrap();
    let dot = render_profile(&profile, &config).unwrap();

    assert!(dot.contains("\tnode [fontname=\"Menlo\", shape=\"box\"];"));
    assert!(dot.contains(
        "\tnode_1 [label=\"app\\nService#handle\\ntotal 0.500s (25.0%)\\nself 0.500s (25.0%)\\ncalls 1\", fontsize=\"21\"];"
    ));
}

#[test]
fn test_malformed_tree_is_rejected() {
    let profile = Profile::new(
        Invocation::new(
            0,
            1_000,
            vec![Invocation::new(1, 100, vec![Invocation::leaf(2, 150)])],
        ),
        names(),
    );
    let err = render_profile(&profile, &DotConfig::default()).unwrap_err();
    assert!(matches!(err, ProfileError::MalformedInput { serial: 1, .. }));
}

#[test]
fn test_invalid_config_rejected_before_aggregation() {
    // Tree is also malformed; the config error must win
    let profile = Profile::new(Invocation::leaf(0, -1), names());
    let config = DotConfig::default().with_base_font_size(0);
    let err = render_profile(&profile, &config).unwrap_err();
    assert!(matches!(err, ProfileError::InvalidConfig(_)));
}
