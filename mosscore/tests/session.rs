mod common;

use common::*;
use mossexpr::prelude::*;
use mosscore::prelude::*;

fn mailbox() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.push("plain", text_message("Lunch"));
    store.push("small", multipart_message("Notes", &[("text/plain", 100)]));
    store.push(
        "large",
        multipart_message("Photos", &[("image/jpeg", 20_000), ("text/plain", 50)]),
    );
    store.push(
        "two",
        multipart_message("Scans", &[("application/pdf", 12_000), ("image/png", 15_000)]),
    );
    store
}

#[test]
fn searching_an_empty_store_finds_nothing() {
    let mut session = empty_session();
    run(&mut session, &["substring", "const x"]);
    select_line(&mut session, 2);
    run(&mut session, &["header Subject"]);
    assert!(session.editor().is_complete());
    assert_eq!(session.search().unwrap(), 0);
    assert_eq!(session.status(), "0 messages found");
}

#[test]
fn incomplete_queries_are_not_searched() {
    let mut session = session(mailbox());
    assert_eq!(session.status(), "query incomplete");
    let err = session.search().unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::IncompleteQuery)));
    assert!(session.results().is_none());
}

#[test]
fn exists_and_forall_over_attachment_sizes() {
    let mut session = session(mailbox());
    type_attachment_query(&mut session, "exists", 10_000);
    assert_eq!(
        pretty(&session),
        "exists _: Attachment in [attachments] . size(_) > 10000"
    );
    run(&mut session, &["search"]);
    let keys: Vec<_> = session
        .results()
        .unwrap()
        .messages
        .iter()
        .map(|m| m.key.as_str())
        .collect();
    assert_eq!(keys, ["large", "two"]);

    // Text parts are not attachments: messages without any pass vacuously.
    let mut session = self::session(mailbox());
    type_attachment_query(&mut session, "forall", 13_000);
    assert_eq!(session.search().unwrap(), 3);
    let keys: Vec<_> = session
        .results()
        .unwrap()
        .messages
        .iter()
        .map(|m| m.key.as_str())
        .collect();
    assert_eq!(keys, ["plain", "small", "large"]);
}

#[test]
fn header_search_decodes_encoded_words() {
    let mut store = mailbox();
    store.push("encoded", text_message("=?UTF-8?B?UmFwcG9ydCBtZW5zdWVs?="));
    store.push("broken", b"\xff\xfe not a message".to_vec());
    let mut session = session(store);
    run(&mut session, &["substring", "const mensuel"]);
    select_line(&mut session, 2);
    run(&mut session, &["header Subject", "search"]);
    let results = session.results().unwrap();
    assert_eq!(results.messages.len(), 1);
    assert_eq!(results.messages[0].key, "encoded");
}

#[test]
fn show_needs_fresh_results() {
    let mut session = session(mailbox());
    assert!(session.feed("show").unwrap_err().is_no_results());

    type_attachment_query(&mut session, "exists", 10_000);
    run(&mut session, &["search", "show"]);
    assert_eq!(session.viewer().shown, vec![vec!["large", "two"]]);
    assert_eq!(session.results_fresh(), Some(true));

    // Editing the threshold makes the results stale.
    run(&mut session, &["mod 14000"]);
    assert_eq!(session.results_fresh(), Some(false));
    assert_eq!(
        session.status(),
        "query changed (previously: 2 messages found)"
    );
    assert!(session.feed("show").unwrap_err().is_stale_results());
    run(&mut session, &["show!"]);
    assert_eq!(session.viewer().shown.len(), 2);

    run(&mut session, &["search"]);
    assert_eq!(session.status(), "2 messages found");
    run(&mut session, &["mod 16000", "search"]);
    assert_eq!(session.status(), "1 messages found");
}

#[test]
fn status_after_the_query_becomes_incomplete() {
    let mut session = session(mailbox());
    type_attachment_query(&mut session, "exists", 10_000);
    assert_eq!(session.status(), "");
    run(&mut session, &["search"]);
    run(&mut session, &["rm"]);
    assert_eq!(
        session.status(),
        "query changed and incomplete (was: 2 messages found)"
    );
}

#[test]
fn failed_commands_keep_the_results_fresh() {
    let mut session = session(mailbox());
    type_attachment_query(&mut session, "exists", 10_000);
    run(&mut session, &["search"]);
    assert!(session.feed("and").is_err());
    assert!(session.feed("nonsense").is_err());
    assert_eq!(session.results_fresh(), Some(true));
}

#[test]
fn quit_ends_the_session() {
    let mut session = empty_session();
    assert_eq!(session.feed("  quit ").unwrap(), Feedback::Quit);
    assert_eq!(session.results_fresh(), None);
}

#[test]
fn quantifying_the_threshold_keeps_the_attachment_binding() {
    let mut session = session(mailbox());
    type_attachment_query(&mut session, "exists", 10_000);
    select_line(&mut session, 5);
    run(&mut session, &["exists"]);
    assert_eq!(
        pretty(&session),
        "exists _: Attachment in [attachments] . exists _1: Int in [10000] . size(_) > _1"
    );

    assert_eq!(session.search().unwrap(), 2);
    let keys: Vec<_> = session
        .results()
        .unwrap()
        .messages
        .iter()
        .map(|m| m.key.as_str())
        .collect();
    assert_eq!(keys, ["large", "two"]);
}

#[test]
fn free_variables_are_reported_without_searching() {
    let mut session = session(mailbox());
    run(&mut session, &["gt", "var"]);
    select_line(&mut session, 2);
    run(&mut session, &["const 5"]);
    assert_eq!(pretty(&session), "_ > 5");
    assert!(session.editor().is_complete());

    let err = session.search().unwrap_err();
    assert!(matches!(err, MossError::Expr(ExprError::FreeVariable { .. })));
    assert!(!err.is_internal());
    assert!(session.results().is_none());

    // Once searched, a failing search leaves the previous results alone.
    let mut session = self::session(mailbox());
    type_attachment_query(&mut session, "exists", 10_000);
    run(&mut session, &["search"]);
    select_line(&mut session, 0);
    run(&mut session, &["mod part"]);
    assert!(session.feed("search").unwrap_err().is_expr());
    assert_eq!(session.results().unwrap().messages.len(), 2);
}
