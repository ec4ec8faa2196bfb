// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Transient vs permanent classification of Kubernetes client errors.
//!
//! Leans towards "transient": these calls run right after cluster and controller bootstrap,
//! where missing CRDs, missing objects and refused connections resolve on their own.

use kube::Error;
use std::error::Error as StdError;
use std::io;

/// API reasons that resolve without intervention
const TRANSIENT_REASONS: &[&str] = &[
    "NotFound",
    "Conflict",
    "TooManyRequests",
    "ServiceUnavailable",
    "Timeout",
    "ServerTimeout",
    "InternalError",
];

/// REST discovery failures while a CRD is still registering
const DISCOVERY_MESSAGES: &[&str] = &[
    "could not find the requested resource",
    "no matches for kind",
];

const CONNECTION_MESSAGES: &[&str] = &[
    "connection refused",
    "connection reset",
    "i/o timeout",
    "unexpected eof",
    "broken pipe",
    "timed out",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Retry within the caller's deadline
    Transient,
    /// An API error that retrying cannot fix
    Permanent,
    /// Not recognised; treated as fatal
    Unclassified,
}

impl ErrorClass {
    pub fn is_transient(self) -> bool {
        self == ErrorClass::Transient
    }
}

pub fn classify(err: &Error) -> ErrorClass {
    match err {
        Error::Api(response) => {
            let code = response.code;
            if code == 404 || code == 409 || code == 429 || code >= 500 {
                return ErrorClass::Transient;
            }
            if TRANSIENT_REASONS.contains(&response.reason.as_str()) {
                return ErrorClass::Transient;
            }
            if contains_any(&response.message, DISCOVERY_MESSAGES) {
                return ErrorClass::Transient;
            }
            ErrorClass::Permanent
        }
        other if is_connection_error(other) => ErrorClass::Transient,
        other if contains_any(&other.to_string(), DISCOVERY_MESSAGES) => ErrorClass::Transient,
        _ => ErrorClass::Unclassified,
    }
}

/// Transport errors wrap the io failure a few levels deep, so every link of the chain is checked
fn is_connection_error(err: &Error) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(link) = current {
        if let Some(io_err) = link.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::BrokenPipe
            ) {
                return true;
            }
        }
        if contains_any(&link.to_string(), CONNECTION_MESSAGES) {
            return true;
        }
        current = link.source();
    }
    false
}

pub fn is_transient(err: &Error) -> bool {
    classify(err).is_transient()
}

pub fn is_not_found(err: &Error) -> bool {
    matches!(err, Error::Api(response) if response.code == 404 || response.reason == "NotFound")
}

/// Case-insensitive substring match
pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, reason: &str, message: &str) -> Error {
        Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_transient_status_codes() {
        for (code, reason) in [
            (404, "NotFound"),
            (409, "Conflict"),
            (429, "TooManyRequests"),
            (500, "InternalError"),
            (503, "ServiceUnavailable"),
            (504, "Timeout"),
        ] {
            assert_eq!(
                classify(&api_error(code, reason, "boom")),
                ErrorClass::Transient,
                "{} {}",
                code,
                reason
            );
        }
    }

    #[test]
    fn test_permanent_api_errors() {
        assert_eq!(
            classify(&api_error(403, "Forbidden", "forbidden")),
            ErrorClass::Permanent
        );
        assert_eq!(
            classify(&api_error(422, "Invalid", "spec.url: Invalid value")),
            ErrorClass::Permanent
        );
    }

    #[test]
    fn test_discovery_messages_are_transient() {
        let err = api_error(
            400,
            "BadRequest",
            "no matches for kind \"Kustomization\" in version \"kustomize.toolkit.fluxcd.io/v1\"",
        );
        assert!(is_transient(&err));
    }

    #[test]
    fn test_connection_errors_are_transient() {
        let refused = Error::Service("tcp connect error: Connection refused (os error 111)".into());
        let reset = Error::Service("connection reset by peer".into());
        let eof = Error::Service("unexpected EOF".into());

        assert!(is_transient(&refused));
        assert!(is_transient(&reset));
        assert!(is_transient(&eof));
    }

    /// Mimics a client transport error: generic outer message, io error as its source
    #[derive(Debug)]
    struct ConnectError(io::Error);

    impl std::fmt::Display for ConnectError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("client error (Connect)")
        }
    }

    impl StdError for ConnectError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_nested_connection_errors_are_transient() {
        let refused = Error::Service(Box::new(ConnectError(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "Connection refused (os error 111)",
        ))));
        assert!(!refused.to_string().to_lowercase().contains("refused"));
        assert_eq!(classify(&refused), ErrorClass::Transient);

        // kind alone is enough, whatever the message says
        let reset = Error::Service(Box::new(ConnectError(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "os error 104",
        ))));
        assert!(is_transient(&reset));

        let tls = Error::Service(Box::new(ConnectError(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid peer certificate",
        ))));
        assert_eq!(classify(&tls), ErrorClass::Unclassified);
    }

    #[test]
    fn test_unrecognised_errors_are_unclassified() {
        let err = Error::Service("certificate verify failed".into());
        assert_eq!(classify(&err), ErrorClass::Unclassified);
        assert!(!is_transient(&err));
    }

    #[test]
    fn test_is_not_found() {
        assert!(is_not_found(&api_error(404, "NotFound", "not found")));
        assert!(!is_not_found(&api_error(409, "Conflict", "conflict")));
        assert!(!is_not_found(&Error::Service("not found".into())));
    }
}
