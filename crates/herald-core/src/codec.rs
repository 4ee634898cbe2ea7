//! Envelope codec.
//!
//! [`decode`] never panics: every malformed input maps to a [`DecodeError`]
//! carrying a diagnostic reason.

use crate::{ClientFrame, Envelope};
use serde_json::Value;

/// Parse one inbound text frame.
pub fn decode(raw: &str) -> Result<Envelope, DecodeError> {
    let value: Value = serde_json::from_str(raw).map_err(DecodeError::Malformed)?;
    let Value::Object(mut fields) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let kind = match fields.remove("type") {
        Some(Value::String(kind)) => kind,
        _ => return Err(DecodeError::MissingKind),
    };
    let content = fields.remove("content").unwrap_or(Value::Null);

    let parsed = match kind.as_str() {
        "NOTIFICATION" => serde_json::from_value(content).map(Envelope::Notification),
        "NEW_NOTIFICATION" => serde_json::from_value(content).map(Envelope::NewNotification),
        "ERROR" => serde_json::from_value(content).map(Envelope::Error),
        _ => return Err(DecodeError::UnknownKind(kind)),
    };

    parsed.map_err(|source| DecodeError::InvalidPayload { kind, source })
}

/// Serialize one outbound frame.
pub fn encode(frame: &ClientFrame) -> Result<String, serde_json::Error> {
    serde_json::to_string(frame)
}

/// Why an inbound frame was rejected.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("frame has no string 'type' field")]
    MissingKind,
    #[error("unrecognised frame type: {0}")]
    UnknownKind(String),
    #[error("invalid {kind} content: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NotificationRecord, Topic};

    #[test]
    fn decode_notification() {
        let env = decode(r#"{"type":"NOTIFICATION","content":{"id":1,"content":"x","userId":2}}"#)
            .unwrap();
        assert_eq!(
            env,
            Envelope::Notification(NotificationRecord::new(1, "x", 2))
        );
    }

    #[test]
    fn decode_error_frame() {
        let env = decode(r#"{"type":"ERROR","content":{"message":"denied"}}"#).unwrap();
        assert!(matches!(env, Envelope::Error(f) if f.message == "denied"));
    }

    #[test]
    fn reject_garbage() {
        assert!(matches!(decode("{not json"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode("[1,2]"), Err(DecodeError::NotAnObject)));
        assert!(matches!(decode(r#"{"content":{}}"#), Err(DecodeError::MissingKind)));
        assert!(matches!(
            decode(r#"{"type":7,"content":{}}"#),
            Err(DecodeError::MissingKind)
        ));
    }

    #[test]
    fn reject_unknown_kind() {
        let err = decode(r#"{"type":"PING","content":{}}"#).unwrap_err();
        assert!(matches!(&err, DecodeError::UnknownKind(k) if k == "PING"));
        assert_eq!(err.to_string(), "unrecognised frame type: PING");
    }

    #[test]
    fn reject_bad_payload() {
        let err = decode(r#"{"type":"NOTIFICATION","content":{"id":"one"}}"#).unwrap_err();
        assert!(matches!(&err, DecodeError::InvalidPayload { kind, .. } if kind == "NOTIFICATION"));

        let err = decode(r#"{"type":"NOTIFICATION"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidPayload { .. }));
    }

    #[test]
    fn encode_frame() {
        let text = encode(&ClientFrame::Unsubscribe {
            destination: Topic::default_topic(),
        })
        .unwrap();
        assert_eq!(
            text,
            r#"{"command":"UNSUBSCRIBE","destination":"/topic/notifications"}"#
        );
    }
}
