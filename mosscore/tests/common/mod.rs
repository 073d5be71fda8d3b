#![allow(dead_code)]

use mosscore::prelude::*;

/// A single-part text message.
pub fn text_message(subject: &str) -> Vec<u8> {
    format!(
        "From: alice@example.com\n\
         To: bob@example.com\n\
         Subject: {subject}\n\
         \n\
         Just text.\n"
    )
    .into_bytes()
}

/// A multipart message with a text body and one base64 part per `(mimetype, len)`,
/// `len` being the number of encoded characters.
pub fn multipart_message(subject: &str, parts: &[(&str, usize)]) -> Vec<u8> {
    let mut out = format!(
        "From: alice@example.com\n\
         Subject: {subject}\n\
         MIME-Version: 1.0\n\
         Content-Type: multipart/mixed; boundary=\"BOUNDARY\"\n\
         \n\
         --BOUNDARY\n\
         Content-Type: text/plain\n\
         \n\
         See attached.\n"
    );
    for (mimetype, len) in parts {
        out.push_str(&format!(
            "--BOUNDARY\n\
             Content-Type: {mimetype}\n\
             Content-Transfer-Encoding: base64\n\
             \n"
        ));
        let body = "A".repeat(*len);
        for chunk in body.as_bytes().chunks(76) {
            out.push_str(std::str::from_utf8(chunk).unwrap());
            out.push('\n');
        }
    }
    out.push_str("--BOUNDARY--\n");
    out.into_bytes()
}

/// Collects whatever it is asked to show.
#[derive(Debug, Default)]
pub struct RecordingViewer {
    pub shown: Vec<Vec<String>>,
}

impl ResultViewer for RecordingViewer {
    fn show(&mut self, messages: &[StoredMessage]) -> MossResult<()> {
        self.shown
            .push(messages.iter().map(|m| m.key.clone()).collect());
        Ok(())
    }
}

pub type TestSession = Session<MemoryStore, RecordingViewer>;

pub fn session(store: MemoryStore) -> TestSession {
    Session::new(store, RecordingViewer::default())
}

pub fn empty_session() -> TestSession {
    session(MemoryStore::new())
}

/// Feed every line, failing the test on the first error.
pub fn run(session: &mut TestSession, lines: &[&str]) {
    for line in lines {
        if let Err(err) = session.feed(line) {
            panic!("'{line}' failed: {err}");
        }
    }
}

/// Select the node on display line `line`.
pub fn select_line(session: &mut TestSession, line: usize) {
    let query = session.editor().query();
    let id = query.flatten(query.root())[line];
    assert!(session.editor_mut().select(id));
}

pub fn pretty(session: &TestSession) -> String {
    use mossexpr::pretty::PrettyQuery;
    let query = session.editor().query();
    query.pretty_string(query.root(), 200)
}

/// `exists _: Attachment in [attachments] . size(_) > threshold`, typed in.
pub fn type_attachment_query(session: &mut TestSession, quantifier: &str, threshold: u64) {
    run(session, &[&format!("{quantifier} attachment"), "attachments"]);
    select_line(session, 2);
    run(session, &["gt", "size", "var"]);
    select_line(session, 5);
    run(session, &[&format!("const {threshold}")]);
}
