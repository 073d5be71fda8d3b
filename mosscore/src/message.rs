//! Adapter from parsed MIME messages to the evaluator's [`Message`] view.

use mailparse::body::Body;
use mailparse::{MailHeaderMap, ParsedMail, parse_header, parse_mail};
use mossexpr::eval::{Attachment, Message};

use crate::error::MossResult;

/// A message parsed with `mailparse`, borrowing its raw bytes.
pub struct ParsedMessage<'a> {
    mail: ParsedMail<'a>,
}

impl<'a> ParsedMessage<'a> {
    pub fn parse(raw: &'a [u8]) -> MossResult<Self> {
        Ok(ParsedMessage {
            mail: parse_mail(raw)?,
        })
    }

    pub fn mail(&self) -> &ParsedMail<'a> {
        &self.mail
    }
}

fn is_multipart_type(mimetype: &str) -> bool {
    mimetype.to_ascii_lowercase().starts_with("multipart/")
}

/// Length of the payload as it is encoded in the message.
fn encoded_len(part: &ParsedMail<'_>) -> u64 {
    let len = match part.get_body_encoded() {
        Body::Base64(body) | Body::QuotedPrintable(body) => body.get_raw().len(),
        Body::SevenBit(body) | Body::EightBit(body) => body.get_raw().len(),
        Body::Binary(body) => body.get_raw().len(),
    };
    len as u64
}

impl Message for ParsedMessage<'_> {
    fn is_multipart(&self) -> bool {
        is_multipart_type(&self.mail.ctype.mimetype)
    }

    fn parts(&self) -> Vec<Attachment> {
        if !self.is_multipart() {
            return Vec::new();
        }
        self.mail
            .subparts
            .iter()
            .enumerate()
            .map(|(index, part)| Attachment {
                index,
                content_type: part.ctype.mimetype.clone(),
                multipart: is_multipart_type(&part.ctype.mimetype),
                payload_len: encoded_len(part),
            })
            .collect()
    }

    fn header(&self, name: &str) -> Option<String> {
        let header = self.mail.headers.get_first_header(name)?;
        Some(decode_header_text(&String::from_utf8_lossy(header.get_value_raw())))
    }
}

/// Decode loose header text (RFC 2047 encoded words), falling back to the input.
pub fn decode_header_text(text: &str) -> String {
    let line = format!("X-Moss: {text}");
    match parse_header(line.as_bytes()) {
        Ok((header, _)) => header.get_value(),
        Err(_) => text.to_string(),
    }
}
