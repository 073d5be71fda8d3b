mod common;

use common::*;
use mossexpr::prelude::*;
use mosscore::prelude::*;

fn root_variant(session: &TestSession) -> Variant {
    let query = session.editor().query();
    query[query.root()].variant()
}

fn selected_label(session: &TestSession) -> String {
    let editor = session.editor();
    editor.query().label(editor.selected())
}

#[test]
fn and_on_the_root_then_again_adds_a_sibling() {
    let mut session = empty_session();
    run(&mut session, &["and"]);
    let query = session.editor().query();
    let and = query.root();
    assert_eq!(query[and].variant(), Variant::And);
    let children = query[and].children();
    assert_eq!(children.len(), 2);
    for c in &children {
        assert!(query[*c].is_placeholder());
        assert_eq!(query[*c].produced_type(), ValueType::Bool);
    }
    assert_eq!(session.editor().selected(), children[0]);

    run(&mut session, &["and"]);
    let query = session.editor().query();
    assert_eq!(query.root(), and);
    assert_eq!(query[and].children().len(), 3);
    assert_eq!(session.editor().selected(), query[and].children()[2]);

    // Forcing replaces the placeholder with a nested connective instead.
    run(&mut session, &["r and"]);
    let query = session.editor().query();
    assert_eq!(query[and].children().len(), 3);
    assert_eq!(query[query[and].children()[2]].variant(), Variant::And);
}

#[test]
fn or_over_a_finished_expression_pushes_it_down() {
    let mut session = empty_session();
    run(&mut session, &["substring", "const draft"]);
    select_line(&mut session, 0);
    run(&mut session, &["or"]);

    let query = session.editor().query();
    let or = query.root();
    assert_eq!(query[or].variant(), Variant::Or);
    let children = query[or].children();
    let [first, second] = children[..] else {
        panic!("expected two operands");
    };
    assert_eq!(query[first].variant(), Variant::Substring);
    assert!(query[second].is_placeholder());
    assert_eq!(pretty(&session), "\"draft\" in ?String \\/ ?Bool");
}

#[test]
fn rm_respects_the_minimum_arity() {
    let mut session = empty_session();
    run(&mut session, &["and"]);
    let before = session.editor().query().render();

    let err = session.feed("rm").unwrap_err();
    assert!(err.is_cannot_remove());
    assert_eq!(session.editor().query().render(), before);

    run(&mut session, &["and"]);
    assert_eq!(session.editor().query().len(), 4);
    run(&mut session, &["rm"]);
    let query = session.editor().query();
    assert_eq!(query[query.root()].children().len(), 2);
    assert_eq!(session.editor().selected(), query.root());

    assert!(session.feed("rm").unwrap_err().is_cannot_remove());
}

#[test]
fn rm_in_a_fixed_slot_leaves_a_placeholder() {
    let mut session = empty_session();
    run(&mut session, &["gt", "const 4"]);
    let revision = session.editor().revision();
    run(&mut session, &["rm"]);
    assert!(session.editor().revision() > revision);
    assert_eq!(pretty(&session), "?Int > ?Int");
    assert_eq!(session.editor().selected(), session.editor().query().root());
}

#[test]
fn replacing_requires_force() {
    let mut session = empty_session();
    run(&mut session, &["substring"]);
    select_line(&mut session, 0);

    assert!(session.feed("gt").unwrap_err().is_must_force_replace());
    assert_eq!(root_variant(&session), Variant::Substring);

    run(&mut session, &["replace gt"]);
    assert_eq!(root_variant(&session), Variant::GreaterThan);
    select_line(&mut session, 0);
    run(&mut session, &["r null"]);
    assert_eq!(root_variant(&session), Variant::Placeholder);
}

#[test]
fn wrong_types_are_rejected_without_changes() {
    let mut session = empty_session();
    run(&mut session, &["substring"]);
    let before = session.editor().query().render();

    let err = session.feed("gt").unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::WrongType { .. })));
    let err = session.feed("attachments").unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::WrongType { .. })));
    assert_eq!(session.editor().query().render(), before);

    // An attachment slot outside a value list cannot hold the whole list.
    let mut session = empty_session();
    run(&mut session, &["gt", "size"]);
    let before = session.editor().query().render();
    let err = session.feed("attachments").unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::WrongType { .. })));
    assert_eq!(session.editor().query().render(), before);
}

#[test]
fn inline_arguments_fill_the_single_parameter() {
    let mut session = empty_session();
    run(&mut session, &["substring", "const \"weekly report\""]);
    select_line(&mut session, 2);
    run(&mut session, &["header Subject"]);
    assert_eq!(pretty(&session), "\"weekly report\" in header(\"Subject\")");

    // A bad inline value leaves the placeholder alone.
    let mut session = empty_session();
    run(&mut session, &["gt"]);
    let err = session.feed("const many").unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::InvalidParameter { .. })));
    assert_eq!(pretty(&session), "?Int > ?Int");
}

#[test]
fn mod_prompts_for_the_parameter() {
    let mut session = empty_session();
    run(&mut session, &["gt", "const"]);
    assert_eq!(selected_label(&session), "0");

    let feedback = session.feed("mod").unwrap();
    assert_eq!(
        feedback,
        Feedback::Input("Enter parameter 'value' (Int): ".to_string())
    );
    assert!(matches!(
        session.editor().state(),
        EditorState::AwaitingParameter { name: "value", ty: ValueType::Int, .. }
    ));
    assert_eq!(session.feed("42").unwrap(), Feedback::Continue);
    assert_eq!(selected_label(&session), "42");
    assert_eq!(session.editor().state(), &EditorState::Normal);

    // Invalid input is reported and the editor goes back to normal.
    run(&mut session, &["mod"]);
    let err = session.feed("forty").unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::InvalidParameter { .. })));
    assert_eq!(session.editor().state(), &EditorState::Normal);
    assert_eq!(selected_label(&session), "42");

    // Empty input cancels.
    run(&mut session, &["mod", ""]);
    assert_eq!(selected_label(&session), "42");

    run(&mut session, &["mod 7"]);
    assert_eq!(selected_label(&session), "7");
}

#[test]
fn mod_on_nodes_without_parameters_fails() {
    let mut session = empty_session();
    run(&mut session, &["and"]);
    select_line(&mut session, 0);
    let err = session.feed("mod").unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::InvalidParameter { .. })));
}

#[test]
fn blank_command_modifies_single_parameter_nodes() {
    let mut session = empty_session();
    run(&mut session, &["substring", "const"]);
    assert!(matches!(session.feed("   ").unwrap(), Feedback::Input(_)));
    run(&mut session, &["invoice"]);
    assert_eq!(selected_label(&session), "\"invoice\"");

    // Nothing to do on a connective.
    select_line(&mut session, 0);
    let revision = session.editor().revision();
    assert_eq!(session.feed("").unwrap(), Feedback::Continue);
    assert_eq!(session.editor().revision(), revision);
}

#[test]
fn quantifier_over_a_bool_pushes_down() {
    let mut session = empty_session();
    run(&mut session, &["gt"]);
    select_line(&mut session, 0);
    run(&mut session, &["forall int"]);

    let query = session.editor().query();
    let q = query.root();
    assert_eq!(query[q].variant(), Variant::ForAll);
    let quantifier = query[q].kind().quantifier().unwrap();
    assert_eq!(quantifier.var_type, ValueType::Int);
    assert_eq!(query[quantifier.body].variant(), Variant::GreaterThan);
    assert_eq!(session.editor().selected(), quantifier.values[0]);
}

#[test]
fn quantifier_over_a_scalar_pushes_far_down() {
    let mut session = empty_session();
    run(&mut session, &["substring", "const invoice"]);
    select_line(&mut session, 2);
    run(&mut session, &["header Subject", "exists"]);

    assert_eq!(root_variant(&session), Variant::Exists);
    assert_eq!(
        pretty(&session),
        "exists _: String in [header(\"Subject\")] . \"invoice\" in _"
    );

    // Mismatching bound type.
    let mut session = empty_session();
    run(&mut session, &["gt", "size"]);
    select_line(&mut session, 1);
    let err = session.feed("exists string").unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::InvalidParameter { .. })));

    // The attachment slot of `size` sits under an Int parent.
    select_line(&mut session, 2);
    let err = session.feed("forall").unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::WrongType { .. })));
}

#[test]
fn more_extends_the_value_list() {
    let mut session = empty_session();
    run(&mut session, &["exists int", "const 1", "more", "const 2", "more"]);
    let query = session.editor().query();
    let q = query.root();
    let values = &query[q].kind().quantifier().unwrap().values;
    assert_eq!(values.len(), 3);
    assert!(query[values[2]].is_placeholder());
    assert_eq!(query[values[2]].produced_type(), ValueType::Int);
    assert_eq!(session.editor().selected(), values[2]);

    select_line(&mut session, 0);
    assert!(session.feed("more").unwrap_err().is_cannot_add_value());
}

#[test]
fn expand_replaces_a_literal_quantifier() {
    let mut session = empty_session();
    run(&mut session, &["forall int", "const 3", "more", "const 4"]);
    select_line(&mut session, 3);
    run(&mut session, &["gt", "var"]);
    select_line(&mut session, 5);
    run(&mut session, &["const 1"]);
    assert_eq!(pretty(&session), "forall _: Int in [3, 4] . _ > 1");

    select_line(&mut session, 3);
    let err = session.feed("expand").unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::CannotExpand(_))));

    select_line(&mut session, 0);
    run(&mut session, &["expand"]);
    assert_eq!(pretty(&session), "3 > 1 /\\ 4 > 1");
}

#[test]
fn command_line_shapes() {
    assert_eq!(CommandLine::parse("  ").unwrap(), CommandLine::Blank);
    assert_eq!(
        CommandLine::parse("r const \"two words\"").unwrap(),
        CommandLine::Command {
            force: true,
            name: "const".to_string(),
            arg: Some("two words".to_string()),
        }
    );
    assert_eq!(
        CommandLine::parse("repl and").unwrap(),
        CommandLine::Command {
            force: true,
            name: "and".to_string(),
            arg: None,
        }
    );
    assert_eq!(
        CommandLine::parse("mod 5").unwrap(),
        CommandLine::Command {
            force: false,
            name: "mod".to_string(),
            arg: Some("5".to_string()),
        }
    );
    assert!(CommandLine::parse("const a b").unwrap_err().is_syntax_error());
    assert!(CommandLine::parse("r const a b").unwrap_err().is_syntax_error());
    assert!(CommandLine::parse("const \"open").unwrap_err().is_syntax_error());

    let mut session = empty_session();
    assert!(session.feed("frobnicate").unwrap_err().is_unknown_command());
    assert_eq!(session.feed("quit").unwrap(), Feedback::Quit);
}

#[test]
fn registry_knows_every_variant_and_builtin() {
    let registry = Registry::new();
    assert_eq!(
        registry.lookup("size"),
        Some(Action::Edit(Edit::Create(Variant::AttachmentSize)))
    );
    assert_eq!(registry.lookup("show!"), Some(Action::Show { force: true }));
    assert_eq!(registry.lookup("rm"), Some(Action::Edit(Edit::Remove)));
    assert_eq!(registry.lookup("r"), None);

    let help = registry.help();
    assert_eq!(help.len(), 12 + 8);
    assert!(help.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[test]
fn selection_follows_display_order() {
    let mut session = empty_session();
    run(&mut session, &["and"]);
    select_line(&mut session, 0);
    let editor = session.editor_mut();
    assert!(!editor.select_prev());
    assert!(editor.select_next());
    assert_eq!(editor.selected_line(), 1);
    assert!(editor.select_next());
    assert!(!editor.select_next());
    assert_eq!(editor.selected_line(), 2);
    assert!(editor.select_prev());
    assert_eq!(editor.selected_line(), 1);
}

#[test]
fn variables_refer_to_the_innermost_binder_of_their_type() {
    let mut session = empty_session();
    run(&mut session, &["forall int", "const 3"]);
    select_line(&mut session, 2);
    run(&mut session, &["exists string"]);
    select_line(&mut session, 4);
    run(&mut session, &["gt", "var"]);
    assert_eq!(
        pretty(&session),
        "forall _: Int in [3] . exists _1: String in [?String] . _ > ?Int"
    );
}
