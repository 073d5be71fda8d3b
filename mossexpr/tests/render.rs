mod common;

use common::*;
use mossexpr::prelude::*;

fn outline(tree: &QueryTree) -> Vec<(usize, String)> {
    tree.render()
        .into_iter()
        .map(|line| (line.indent, line.label))
        .collect()
}

#[test]
fn labels_of_every_variant() {
    let tree = attachment_size_query(Variant::Exists, 10);
    assert_eq!(
        outline(&tree),
        vec![
            (0, "EXISTS _:Attachment".to_string()),
            (2, "ALL ATTACHMENTS".to_string()),
            (1, "GREATER THAN".to_string()),
            (2, "ATTACHMENT SIZE".to_string()),
            (3, "_ : Attachment".to_string()),
            (2, "10".to_string()),
        ]
    );

    let mut tree = QueryTree::new(ValueType::Bool);
    let root = tree.root();
    assert_eq!(tree.label(root), "<?:Bool>");
    let or = tree.install(root, Variant::Or, &[]).unwrap();
    assert_eq!(tree.label(or), "OR");
    let sub = tree.install(child(&tree, or, 0), Variant::Substring, &[]).unwrap();
    assert_eq!(tree.label(sub), "SUBSTRING");
    let needle = child(&tree, sub, 0);
    let needle = string_const(&mut tree, needle, "draft");
    assert_eq!(tree.label(needle), "\"draft\"");
    let haystack = tree
        .install(child(&tree, sub, 1), Variant::CustomHeader, &[])
        .unwrap();
    assert_eq!(tree.label(haystack), "HEADER ?");
    tree.set_param(haystack, "name", Literal::String("To".into()))
        .unwrap();
    assert_eq!(tree.label(haystack), "HEADER: To");

    let q = tree
        .install(child(&tree, or, 1), Variant::ForAll, &[Literal::Type(ValueType::Size)])
        .unwrap();
    assert_eq!(tree.label(q), "FOR ALL _:Size");
    let value = tree.install(child(&tree, q, 0), Variant::Const, &[]).unwrap();
    tree.set_param(value, "value", Literal::Size(2_000_000)).unwrap();
    assert_eq!(tree.label(value), "2M");
}

#[test]
fn quantifier_values_sit_deeper_than_the_body() {
    let tree = int_domain_query(Variant::ForAll, &[1, 2], 0);
    let lines = tree.render();
    let indents: Vec<usize> = lines.iter().map(|l| l.indent).collect();
    assert_eq!(indents, vec![0, 2, 2, 1, 2, 2]);

    // Display order is flatten order.
    let nodes: Vec<NodeId> = lines.iter().map(|l| l.node).collect();
    assert_eq!(nodes, tree.flatten(tree.root()));
    for (i, id) in nodes.iter().enumerate() {
        assert_eq!(tree.line_of(*id), Some(i));
    }
}

#[test]
fn selection_hints_point_at_the_first_hole() {
    let mut tree = QueryTree::new(ValueType::Bool);
    let root = tree.root();
    let and = tree.install(root, Variant::And, &[]).unwrap();
    assert_eq!(tree.selection_hint(and), child(&tree, and, 0));

    let q = tree.install(child(&tree, and, 0), Variant::Exists, &[]).unwrap();
    assert_eq!(tree.selection_hint(q), child(&tree, q, 0));

    let gt = tree.install(child(&tree, and, 1), Variant::GreaterThan, &[]).unwrap();
    assert_eq!(tree.selection_hint(gt), child(&tree, gt, 0));

    let lhs = child(&tree, gt, 0);
    let size = tree.install(lhs, Variant::AttachmentSize, &[]).unwrap();
    assert_eq!(tree.selection_hint(size), child(&tree, size, 0));

    let rhs = child(&tree, gt, 1);
    let constant = int_const(&mut tree, rhs, 1);
    assert_eq!(tree.selection_hint(constant), constant);
}

#[test]
fn pretty_prints_infix() {
    let tree = attachment_size_query(Variant::Exists, 10);
    assert_eq!(
        tree.pretty_string(tree.root(), 80),
        "exists _: Attachment in [attachments] . size(_) > 10"
    );

    let mut tree = QueryTree::new(ValueType::Bool);
    let root = tree.root();
    let and = tree.install(root, Variant::And, &[]).unwrap();
    let or = tree.push_down(child(&tree, and, 1), Variant::Or, &[]).unwrap();
    assert_eq!(tree.pretty_string(and, 80), "?Bool /\\ (?Bool \\/ ?Bool)");
    assert_eq!(tree.pretty_string(or, 80), "?Bool \\/ ?Bool");
}

#[test]
fn narrow_widths_break_lines_without_changing_tokens() {
    let tree = int_domain_query(Variant::ForAll, &[100, 200, 300], 150);
    let root = tree.root();
    let wide = tree.pretty_string(root, 200);
    assert!(!wide.contains('\n'));

    let narrow = tree.pretty_string(root, 12);
    assert!(narrow.contains('\n'));
    let tokens = narrow.split_whitespace().collect::<Vec<_>>().join(" ");
    assert_eq!(tokens, wide);
}

#[test]
fn colored_output_carries_the_same_text() {
    let tree = attachment_size_query(Variant::ForAll, 1);
    let mut buf = termcolor::Buffer::no_color();
    tree.pretty_render_to(tree.root(), 80, &mut buf).unwrap();
    let text = String::from_utf8(buf.into_inner()).unwrap();
    assert_eq!(text, tree.pretty_string(tree.root(), 80));
}
