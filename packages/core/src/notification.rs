use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a terminal notification emitted by a request handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// The operation completed and the transport considers it a success.
    Success,
    /// The operation completed but the application reported a failure.
    Fail,
    /// The transport itself failed (DNS, connection, decoding, ...).
    Error,
    /// The transport gave up waiting.
    Timeout,
    /// The operation was aborted before completing.
    Abort,
}

impl NotificationKind {
    /// Every terminal notification kind, in subscription order.
    pub const ALL: [NotificationKind; 5] = [
        NotificationKind::Success,
        NotificationKind::Fail,
        NotificationKind::Error,
        NotificationKind::Timeout,
        NotificationKind::Abort,
    ];

    /// The event name this kind is emitted under.
    pub fn name(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Fail => "fail",
            NotificationKind::Error => "error",
            NotificationKind::Timeout => "timeout",
            NotificationKind::Abort => "abort",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A terminal notification with its payload.
///
/// `T` is the result payload, `R` the response metadata and `E` the
/// transport error type.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification<T, R, E> {
    Success { result: T, response: R },
    Fail { result: T, response: R },
    Error { error: E, response: Option<R> },
    /// Carries the duration, in milliseconds, the transport waited.
    Timeout { ms: u64 },
    Abort,
}

impl<T, R, E> Notification<T, R, E> {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Success { .. } => NotificationKind::Success,
            Notification::Fail { .. } => NotificationKind::Fail,
            Notification::Error { .. } => NotificationKind::Error,
            Notification::Timeout { .. } => NotificationKind::Timeout,
            Notification::Abort => NotificationKind::Abort,
        }
    }

    /// Response metadata, when the notification carries any.
    pub fn response(&self) -> Option<&R> {
        match self {
            Notification::Success { response, .. } | Notification::Fail { response, .. } => {
                Some(response)
            }
            Notification::Error { response, .. } => response.as_ref(),
            Notification::Timeout { .. } | Notification::Abort => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Note = Notification<u32, &'static str, String>;

    #[test]
    fn kind_names_round_trip() {
        for kind in NotificationKind::ALL {
            assert_eq!(NotificationKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(NotificationKind::from_name("complete"), None);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_value(NotificationKind::Timeout).unwrap();
        assert_eq!(json, serde_json::json!("timeout"));
    }

    #[test]
    fn notification_reports_its_kind() {
        let success: Note = Notification::Success {
            result: 1,
            response: "200",
        };
        let error: Note = Notification::Error {
            error: "boom".to_string(),
            response: None,
        };
        assert_eq!(success.kind(), NotificationKind::Success);
        assert_eq!(error.kind(), NotificationKind::Error);
        assert_eq!(Note::Timeout { ms: 15 }.kind(), NotificationKind::Timeout);
        assert_eq!(Note::Abort.kind(), NotificationKind::Abort);
    }

    #[test]
    fn response_metadata_is_exposed() {
        let fail: Note = Notification::Fail {
            result: 7,
            response: "404",
        };
        assert_eq!(fail.response(), Some(&"404"));
        assert_eq!(Note::Abort.response(), None);
    }
}
