use super::*;
use folio_ast::DocumentInfo;
use folio_style::{BorderStyle, FontWeight, StyleProperty, StyleValue};
use folio_types::Color;

fn doc(children: Vec<Node>) -> Node {
    Node::document(DocumentInfo::default(), children)
}

fn find<'r, 'a>(root: &'r ResolvedNode<'a>, id: &str) -> &'r ResolvedNode<'a> {
    root.walk()
        .find(|n| n.id.as_str() == id)
        .unwrap_or_else(|| panic!("no node with id {}", id))
}

#[test]
fn document_level_property_reaches_every_descendant() {
    let root = doc(vec![
        Node::section("Intro", vec![Node::text_paragraph("hello")]),
        Node::simple_table(vec!["a"], vec![vec!["b"]]),
        Node::bullet_list(vec!["x", "y"]),
    ])
    .with_style(StyleProperty::Color, "#336699");

    let resolved = resolve(&root, &LayoutConfig::default()).unwrap();
    for node in resolved.walk() {
        assert_eq!(node.style.color, Color::rgb(0x33, 0x66, 0x99), "node {}", node.id);
    }
}

#[test]
fn nearest_override_wins() {
    let root = doc(vec![
        Node::sequence(vec![Node::paragraph(vec![
            Node::text("plain"),
            Node::text("big").with_id("big").with_style(StyleProperty::FontSize, "20pt"),
        ])])
        .with_style(StyleProperty::FontSize, 14.0_f32),
    ])
    .with_style(StyleProperty::FontSize, 12.0_f32);

    let resolved = resolve(&root, &LayoutConfig::default()).unwrap();
    assert_eq!(resolved.style.font_size, 12.0);
    assert_eq!(find(&resolved, "document/0/0/0").style.font_size, 14.0);
    assert_eq!(find(&resolved, "big").style.font_size, 20.0);
}

#[test]
fn unstyled_children_share_the_parent_snapshot() {
    let root = doc(vec![Node::text_paragraph("shared")]);
    let resolved = resolve(&root, &LayoutConfig::default()).unwrap();
    let paragraph = &resolved.children[0];
    assert!(Arc::ptr_eq(&resolved.style, &paragraph.style));
    assert!(Arc::ptr_eq(&paragraph.style, &paragraph.children[0].style));
}

#[test]
fn table_layer_shadows_document_defaults_but_not_cell_overrides() {
    let root = doc(vec![
        Node::table(vec![Node::row(vec![
            Node::text_cell("default").with_id("plain"),
            Node::text_cell("custom")
                .with_id("custom")
                .with_style(StyleProperty::Border, "2pt dashed #FF0000"),
        ])]),
        Node::text_paragraph("outside").with_id("outside"),
    ])
    .with_style(StyleProperty::Border, "3pt dotted #00FF00");

    let resolved = resolve(&root, &LayoutConfig::default()).unwrap();

    let plain = find(&resolved, "plain");
    assert_eq!(plain.style.border.width, 0.5);
    assert_eq!(plain.style.border.style, BorderStyle::Solid);
    assert_eq!(plain.style.border.color, Color::BLACK);
    assert_eq!(plain.style.padding.left, 4.0);

    let custom = find(&resolved, "custom");
    assert_eq!(custom.style.border.width, 2.0);
    assert_eq!(custom.style.border.style, BorderStyle::Dashed);

    assert_eq!(find(&resolved, "outside").style.border.style, BorderStyle::Dotted);
}

#[test]
fn table_overrides_sit_above_the_synthetic_layer() {
    let root = doc(vec![
        Node::table(vec![Node::row(vec![Node::text_cell("c").with_id("c")])])
            .with_style(StyleProperty::Border, StyleValue::None),
    ]);
    let resolved = resolve(&root, &LayoutConfig::default()).unwrap();
    assert!(!find(&resolved, "c").style.border.is_visible());
}

#[test]
fn header_rows_are_bold_unless_overridden() {
    let root = doc(vec![Node::table(vec![
        Node::header_row(vec![Node::text_cell("h").with_id("h")]),
        Node::header_row(vec![Node::text_cell("n").with_id("n")])
            .with_style(StyleProperty::FontWeight, "normal"),
        Node::row(vec![Node::text_cell("b").with_id("b")]),
    ])]);
    let resolved = resolve(&root, &LayoutConfig::default()).unwrap();
    assert_eq!(find(&resolved, "h").style.font_weight, FontWeight::Bold);
    assert_eq!(find(&resolved, "n").style.font_weight, FontWeight::Regular);
    assert_eq!(find(&resolved, "b").style.font_weight, FontWeight::Regular);
}

#[test]
fn path_ids_restart_below_explicit_ids() {
    let root = doc(vec![
        Node::text_paragraph("a"),
        Node::section("S", vec![Node::text_paragraph("b")]).with_id("intro"),
    ]);
    let resolved = resolve(&root, &LayoutConfig::default()).unwrap();
    assert_eq!(resolved.id.as_str(), "document");
    assert_eq!(resolved.children[0].id.as_str(), "document/0");
    assert_eq!(resolved.children[0].children[0].id.as_str(), "document/0/0");
    assert_eq!(resolved.children[1].children[0].id.as_str(), "intro/0");
}

#[test]
fn malformed_value_reports_the_offending_node() {
    let root = doc(vec![
        Node::text_paragraph("x")
            .with_id("bad-para")
            .with_style(StyleProperty::Color, "not-a-color"),
    ]);
    match resolve(&root, &LayoutConfig::default()) {
        Err(LayoutError::UnresolvableStyleProperty { node_id, source }) => {
            assert_eq!(node_id.as_str(), "bad-para");
            assert_eq!(source.property, StyleProperty::Color);
            assert_eq!(source.value, "not-a-color");
        }
        other => panic!("expected UnresolvableStyleProperty, got {:?}", other),
    }
}

#[test]
fn structural_violations_are_unsupported() {
    let cases = vec![
        (doc(vec![Node::text("loose").with_id("run")]), "run"),
        (
            doc(vec![Node::table(vec![Node::row(vec![
                Node::cell(vec![Node::page_break().with_id("pb")]),
            ])])]),
            "pb",
        ),
        (doc(vec![Node::table(vec![Node::text_cell("c").with_id("cell")])]), "cell"),
        (
            doc(vec![Node::table(vec![Node::row(vec![
                Node::text_cell("c").with_id("zero").with_span(0, 1),
            ])])]),
            "zero",
        ),
        (doc(vec![doc(vec![]).with_id("inner")]), "inner"),
    ];

    for (root, expected) in cases {
        match resolve(&root, &LayoutConfig::default()) {
            Err(LayoutError::UnsupportedNodeKind { node_id, .. }) => assert_eq!(node_id.as_str(), expected),
            other => panic!("expected UnsupportedNodeKind for {}, got {:?}", expected, other),
        }
    }
}

#[test]
fn root_must_be_a_document() {
    let root = Node::text_paragraph("orphan");
    assert!(matches!(
        resolve(&root, &LayoutConfig::default()),
        Err(LayoutError::UnsupportedNodeKind { kind: "Paragraph", .. })
    ));
}
