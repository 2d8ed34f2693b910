//! Response payload forms and charset decoding

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Charset used when none is configured
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Raw response content as handed to the viewer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponsePayload {
    /// No content has been set yet
    #[default]
    Absent,
    /// Explicitly empty content (`null` or `false` on the wire)
    Empty,
    /// Already decoded text
    Text(String),
    /// Undecoded body bytes
    Bytes(Vec<u8>),
}

impl ResponsePayload {
    /// Whether a decoded form exists at all
    pub fn is_set(&self) -> bool {
        !matches!(self, ResponsePayload::Absent)
    }

    /// Text and byte payloads need a decoding pass; the others are
    /// applied immediately
    pub fn needs_decoding(&self) -> bool {
        matches!(self, ResponsePayload::Text(_) | ResponsePayload::Bytes(_))
    }

    /// Decode the payload with the given charset label.
    ///
    /// Returns `None` for [`ResponsePayload::Absent`] and an empty string for
    /// [`ResponsePayload::Empty`]. Byte payloads are decoded with the
    /// charset's decoder; malformed sequences get the decoder's replacement
    /// character and nothing else is dropped.
    pub fn decode(&self, charset: Option<&str>) -> Option<Cow<'_, str>> {
        match self {
            ResponsePayload::Absent => None,
            ResponsePayload::Empty => Some(Cow::Borrowed("")),
            ResponsePayload::Text(text) => Some(Cow::Borrowed(text.as_str())),
            ResponsePayload::Bytes(bytes) => Some(decode_bytes(bytes, charset)),
        }
    }

    /// Parse a payload from its JSON wire form
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

impl From<String> for ResponsePayload {
    fn from(text: String) -> Self {
        ResponsePayload::Text(text)
    }
}

impl From<&str> for ResponsePayload {
    fn from(text: &str) -> Self {
        ResponsePayload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for ResponsePayload {
    fn from(bytes: Vec<u8>) -> Self {
        ResponsePayload::Bytes(bytes)
    }
}

/// Resolve a charset label, falling back to UTF-8 for unknown labels
pub fn resolve_charset(charset: Option<&str>) -> &'static Encoding {
    let label = charset
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CHARSET);

    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) => encoding,
        None => {
            tracing::warn!(charset = label, "Unknown charset, decoding as UTF-8");
            UTF_8
        }
    }
}

fn decode_bytes<'a>(bytes: &'a [u8], charset: Option<&str>) -> Cow<'a, str> {
    let encoding = resolve_charset(charset);
    let (decoded, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        tracing::debug!(
            encoding = encoding.name(),
            "Body contained malformed sequences"
        );
    }
    decoded
}

/// JSON forms accepted for a payload
#[derive(Deserialize)]
#[serde(untagged)]
enum WirePayload {
    Text(String),
    Flag(bool),
    Wrapped {
        #[serde(rename = "type")]
        kind: String,
        data: Vec<u8>,
    },
    Bytes(Vec<u8>),
    Null(()),
}

impl<'de> Deserialize<'de> for ResponsePayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match WirePayload::deserialize(deserializer)? {
            WirePayload::Text(text) => Ok(ResponsePayload::Text(text)),
            WirePayload::Flag(false) | WirePayload::Null(()) => Ok(ResponsePayload::Empty),
            WirePayload::Flag(true) => Err(de::Error::custom("`true` is not a response payload")),
            WirePayload::Wrapped { kind, data } if kind == "Buffer" => {
                Ok(ResponsePayload::Bytes(data))
            }
            WirePayload::Wrapped { kind, .. } => Err(de::Error::custom(format!(
                "unsupported wrapped payload type: {}",
                kind
            ))),
            WirePayload::Bytes(data) => Ok(ResponsePayload::Bytes(data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_returned_as_is() {
        let payload = ResponsePayload::from("{\"a\":1}");
        assert_eq!(payload.decode(None).as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_absent_and_empty_are_distinct() {
        assert_eq!(ResponsePayload::Absent.decode(None), None);
        assert_eq!(ResponsePayload::Empty.decode(None).as_deref(), Some(""));
        assert!(!ResponsePayload::Absent.is_set());
        assert!(ResponsePayload::Empty.is_set());
    }

    #[test]
    fn test_bytes_decode_as_utf8_by_default() {
        let payload = ResponsePayload::from("zażółć".as_bytes().to_vec());
        assert_eq!(payload.decode(None).as_deref(), Some("zażółć"));
        // Decoding twice yields the same string
        assert_eq!(payload.decode(None), payload.decode(None));
    }

    #[test]
    fn test_bytes_decode_with_charset() {
        // "café" in ISO-8859-1
        let payload = ResponsePayload::Bytes(vec![0x63, 0x61, 0x66, 0xE9]);
        assert_eq!(payload.decode(Some("iso-8859-1")).as_deref(), Some("café"));
    }

    #[test]
    fn test_unknown_charset_falls_back_to_utf8() {
        let payload = ResponsePayload::Bytes(b"plain".to_vec());
        assert_eq!(payload.decode(Some("no-such-charset")).as_deref(), Some("plain"));
    }

    #[test]
    fn test_bom_is_removed() {
        let payload = ResponsePayload::Bytes(vec![0xEF, 0xBB, 0xBF, b'o', b'k']);
        assert_eq!(payload.decode(None).as_deref(), Some("ok"));
    }

    #[test]
    fn test_malformed_bytes_are_replaced_not_dropped() {
        let payload = ResponsePayload::Bytes(vec![b'a', 0xFF, b'b']);
        assert_eq!(payload.decode(None).as_deref(), Some("a\u{FFFD}b"));
    }

    #[test]
    fn test_wire_forms() {
        assert_eq!(
            ResponsePayload::from_json("\"hello\"").unwrap(),
            ResponsePayload::Text("hello".into())
        );
        assert_eq!(ResponsePayload::from_json("null").unwrap(), ResponsePayload::Empty);
        assert_eq!(ResponsePayload::from_json("false").unwrap(), ResponsePayload::Empty);
        assert_eq!(
            ResponsePayload::from_json("[104, 105]").unwrap(),
            ResponsePayload::Bytes(b"hi".to_vec())
        );
        assert!(ResponsePayload::from_json("true").is_err());
    }

    #[test]
    fn test_wrapped_buffer_is_unwrapped() {
        let payload =
            ResponsePayload::from_json(r#"{"type":"Buffer","data":[123,125]}"#).unwrap();
        assert_eq!(payload, ResponsePayload::Bytes(b"{}".to_vec()));
        assert_eq!(payload.decode(None).as_deref(), Some("{}"));

        assert!(ResponsePayload::from_json(r#"{"type":"Blob","data":[1]}"#).is_err());
    }
}
