//! Pulls the subject and a plain-text body out of a Gmail message payload.

use super::models::{EmailMessage, MessagePart, MessagePartBody, MessagePayload, RawMessage};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use tracing::warn;

const PLAIN_TEXT: &str = "text/plain";

// Gmail sometimes pads base64url data and sometimes does not
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Subject and body of one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedBody {
    pub subject: String,
    pub body: String,
}

/// Decode a payload; missing headers or parts give empty strings
pub fn decode(payload: &MessagePayload) -> DecodedBody {
    DecodedBody {
        subject: subject(payload),
        body: body(payload),
    }
}

/// Decode a full message into an `EmailMessage`
pub fn decode_message(raw: &RawMessage) -> EmailMessage {
    let decoded = raw.payload.as_ref().map(decode).unwrap_or_default();
    EmailMessage {
        id: raw.id.clone(),
        subject: decoded.subject,
        body: decoded.body,
    }
}

fn subject(payload: &MessagePayload) -> String {
    payload
        .headers
        .iter()
        .flatten()
        .find(|h| h.name == "Subject")
        .map(|h| h.value.clone())
        .unwrap_or_default()
}

fn body(payload: &MessagePayload) -> String {
    match payload.parts.as_deref() {
        Some(parts) if !parts.is_empty() => {
            let chosen = find_plain_text(parts).or_else(|| first_leaf(&parts[0]));
            chosen.map(decode_part_body).unwrap_or_default()
        }
        _ => payload.body.as_ref().map(decode_part_body).unwrap_or_default(),
    }
}

/// Depth-first search for a `text/plain` part that carries data
fn find_plain_text(parts: &[MessagePart]) -> Option<&MessagePartBody> {
    for part in parts {
        if part.mime_type == PLAIN_TEXT {
            if let Some(body) = part.body.as_ref().filter(|b| b.data.is_some()) {
                return Some(body);
            }
        }
        if let Some(nested) = part.parts.as_deref().and_then(find_plain_text) {
            return Some(nested);
        }
    }
    None
}

/// Body of the first part, descending into nested multiparts
fn first_leaf(part: &MessagePart) -> Option<&MessagePartBody> {
    if let Some(body) = part.body.as_ref().filter(|b| b.data.is_some()) {
        return Some(body);
    }
    part.parts.as_deref()?.first().and_then(first_leaf)
}

fn decode_part_body(body: &MessagePartBody) -> String {
    body.data.as_deref().map(decode_base64url).unwrap_or_default()
}

/// Decode base64url text, replacing invalid UTF-8 with U+FFFD
pub fn decode_base64url(data: &str) -> String {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    match URL_SAFE_LENIENT.decode(cleaned.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("Base64 decode failed: {}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::gmail::models::MessageHeader;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn encoded(text: &str) -> MessagePartBody {
        MessagePartBody {
            data: Some(URL_SAFE_NO_PAD.encode(text)),
            ..Default::default()
        }
    }

    fn part(mime: &str, text: &str) -> MessagePart {
        MessagePart {
            mime_type: mime.to_string(),
            body: Some(encoded(text)),
            ..Default::default()
        }
    }

    fn headers(pairs: &[(&str, &str)]) -> Option<Vec<MessageHeader>> {
        Some(
            pairs
                .iter()
                .map(|(name, value)| MessageHeader {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_single_part_body() {
        let payload = MessagePayload {
            headers: headers(&[("From", "a@example.com"), ("Subject", "Planning")]),
            mime_type: PLAIN_TEXT.to_string(),
            body: Some(encoded("See you tomorrow at 4pm")),
            parts: None,
        };
        let decoded = decode(&payload);
        assert_eq!(decoded.subject, "Planning");
        assert_eq!(decoded.body, "See you tomorrow at 4pm");
    }

    #[test]
    fn test_prefers_plain_text_part() {
        let payload = MessagePayload {
            mime_type: "multipart/alternative".to_string(),
            parts: Some(vec![part("text/html", "<p>html</p>"), part(PLAIN_TEXT, "plain")]),
            ..Default::default()
        };
        assert_eq!(decode(&payload).body, "plain");
    }

    #[test]
    fn test_falls_back_to_first_part() {
        let payload = MessagePayload {
            parts: Some(vec![part("text/html", "<p>first</p>"), part("image/png", "png")]),
            ..Default::default()
        };
        assert_eq!(decode(&payload).body, "<p>first</p>");
    }

    #[test]
    fn test_finds_nested_plain_text() {
        let alternative = MessagePart {
            mime_type: "multipart/alternative".to_string(),
            parts: Some(vec![part("text/html", "<b>x</b>"), part(PLAIN_TEXT, "nested plain")]),
            ..Default::default()
        };
        let payload = MessagePayload {
            mime_type: "multipart/mixed".to_string(),
            parts: Some(vec![alternative, part("application/pdf", "pdf")]),
            ..Default::default()
        };
        assert_eq!(decode(&payload).body, "nested plain");
    }

    #[test]
    fn test_subject_header_is_case_sensitive() {
        let payload = MessagePayload {
            headers: headers(&[("subject", "lowercase")]),
            ..Default::default()
        };
        assert_eq!(decode(&payload).subject, "");
    }

    #[test]
    fn test_missing_everything_gives_empty_strings() {
        assert_eq!(decode(&MessagePayload::default()), DecodedBody::default());
        let message = decode_message(&RawMessage {
            id: "m1".to_string(),
            payload: None,
        });
        assert_eq!(message.subject, "");
        assert_eq!(message.body, "");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let payload = MessagePayload {
            body: Some(MessagePartBody {
                data: Some(URL_SAFE_NO_PAD.encode([b'h', b'i', 0xff, b'!'])),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(decode(&payload).body, "hi\u{FFFD}!");
    }

    #[test]
    fn test_padded_and_garbage_data() {
        assert_eq!(decode_base64url("aGk="), "hi");
        assert_eq!(decode_base64url("aGk"), "hi");
        assert_eq!(decode_base64url("%%%"), "");
    }
}
