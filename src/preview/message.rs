//! Messages exchanged with the preview surface

use serde::{Deserialize, Serialize};

/// Host to surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreviewMessage {
    /// Replace the surface content
    RawResponse {
        #[serde(rename = "rawResponse")]
        raw_response: String,
    },
    /// Clear the surface content
    CleanUp {
        #[serde(rename = "cleanUp")]
        clean_up: bool,
    },
}

impl PreviewMessage {
    pub fn raw_response(text: impl Into<String>) -> Self {
        PreviewMessage::RawResponse {
            raw_response: text.into(),
        }
    }

    pub fn clean_up() -> Self {
        PreviewMessage::CleanUp { clean_up: true }
    }
}

/// Surface to host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreviewReply {
    /// Rows the surface needs to show its content
    Height {
        #[serde(rename = "preview-window-height")]
        height: u16,
    },
    /// The user asked to close the preview
    Close {
        #[serde(rename = "preview-window-close")]
        close: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_shapes() {
        assert_eq!(
            serde_json::to_string(&PreviewMessage::raw_response("<p>x</p>")).unwrap(),
            r#"{"rawResponse":"<p>x</p>"}"#
        );
        assert_eq!(
            serde_json::to_string(&PreviewMessage::clean_up()).unwrap(),
            r#"{"cleanUp":true}"#
        );
    }

    #[test]
    fn test_reply_wire_shapes() {
        let height: PreviewReply = serde_json::from_str(r#"{"preview-window-height":42}"#).unwrap();
        assert_eq!(height, PreviewReply::Height { height: 42 });

        let close: PreviewReply = serde_json::from_str(r#"{"preview-window-close":true}"#).unwrap();
        assert_eq!(close, PreviewReply::Close { close: true });

        assert!(serde_json::from_str::<PreviewReply>(r#"{"other":1}"#).is_err());
    }
}
