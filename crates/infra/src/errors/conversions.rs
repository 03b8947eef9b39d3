//! Conversions from external infrastructure errors into domain errors.
//!
//! This is the only place where backend faults are classified. Status policy:
//! 409 is a slot conflict, 401/403 an authorization failure, 404/410 a missing
//! appointment, and everything else (throttling, 5xx, undecodable bodies,
//! connection errors) a transient failure.

use jsonwebtoken::errors::Error as JwtError;
use rendezvous_domain::RendezvousError;
use reqwest::{Error as HttpError, StatusCode};

/// Longest slice of a backend error body kept in error messages.
const MAX_DETAIL_CHARS: usize = 200;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RendezvousError);

impl From<InfraError> for RendezvousError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RendezvousError> for InfraError {
    fn from(value: RendezvousError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRendezvousError {
    fn into_rendezvous(self) -> RendezvousError;
}

/* -------------------------------------------------------------------------- */
/* HTTP status → RendezvousError */
/* -------------------------------------------------------------------------- */

/// Classify a non-success calendar API response.
///
/// `body` is the raw response body; Google reports quota exhaustion as a 403
/// whose reason is `rateLimitExceeded`, which is transient rather than an
/// authorization problem.
pub fn error_for_status(status: StatusCode, body: &str) -> RendezvousError {
    let code = status.as_u16();
    let detail: String = body.trim().chars().take(MAX_DETAIL_CHARS).collect();
    let message = if detail.is_empty() {
        format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"))
    } else {
        format!(
            "HTTP {} {}: {}",
            code,
            status.canonical_reason().unwrap_or("unknown status"),
            detail
        )
    };

    match code {
        409 => RendezvousError::SlotConflict(message),
        403 if is_rate_limited(body) => RendezvousError::Transient(message),
        401 | 403 => RendezvousError::PermissionDenied(message),
        404 | 410 => RendezvousError::NotFound(message),
        _ => RendezvousError::Transient(message),
    }
}

fn is_rate_limited(body: &str) -> bool {
    body.to_ascii_lowercase().contains("ratelimitexceeded")
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RendezvousError */
/* -------------------------------------------------------------------------- */

impl IntoRendezvousError for HttpError {
    fn into_rendezvous(self) -> RendezvousError {
        if self.is_timeout() {
            return RendezvousError::Transient("HTTP request timed out".into());
        }

        if self.is_connect() {
            return RendezvousError::Transient("HTTP connection failure".into());
        }

        if self.is_decode() {
            return RendezvousError::Transient(format!("malformed response body: {self}"));
        }

        if let Some(status) = self.status() {
            return error_for_status(status, "");
        }

        RendezvousError::Transient(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_rendezvous())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → RendezvousError */
/* -------------------------------------------------------------------------- */

impl IntoRendezvousError for serde_json::Error {
    fn into_rendezvous(self) -> RendezvousError {
        RendezvousError::Transient(format!("malformed calendar payload: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_rendezvous())
    }
}

/* -------------------------------------------------------------------------- */
/* jsonwebtoken::Error → RendezvousError */
/* -------------------------------------------------------------------------- */

impl IntoRendezvousError for JwtError {
    fn into_rendezvous(self) -> RendezvousError {
        RendezvousError::Config(format!("cannot sign service account assertion: {self}"))
    }
}

impl From<JwtError> for InfraError {
    fn from(value: JwtError) -> Self {
        InfraError(value.into_rendezvous())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use tokio::runtime::Runtime;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn conflict_maps_to_slot_conflict() {
        let mapped = error_for_status(StatusCode::CONFLICT, "");
        match mapped {
            RendezvousError::SlotConflict(msg) => assert!(msg.contains("409")),
            other => panic!("expected slot conflict, got {other:?}"),
        }
    }

    #[test]
    fn authorization_failures_map_to_permission_denied() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert!(matches!(
                error_for_status(status, r#"{"error":{"errors":[{"reason":"forbidden"}]}}"#),
                RendezvousError::PermissionDenied(_)
            ));
        }
    }

    #[test]
    fn quota_exhaustion_is_transient() {
        let body = r#"{"error":{"errors":[{"reason":"userRateLimitExceeded"}],"code":403}}"#;
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, body),
            RendezvousError::Transient(_)
        ));
    }

    #[test]
    fn missing_and_gone_map_to_not_found() {
        assert!(matches!(error_for_status(StatusCode::NOT_FOUND, ""), RendezvousError::NotFound(_)));
        assert!(matches!(error_for_status(StatusCode::GONE, ""), RendezvousError::NotFound(_)));
    }

    #[test]
    fn everything_else_is_transient() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            assert!(matches!(error_for_status(status, ""), RendezvousError::Transient(_)), "{status}");
        }
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(5_000);
        let RendezvousError::Transient(msg) = error_for_status(StatusCode::BAD_GATEWAY, &body) else {
            panic!("expected transient error");
        };
        assert!(msg.len() < 300);
    }

    #[test]
    fn malformed_json_is_transient() {
        let err = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let mapped: RendezvousError = InfraError::from(err).into();
        assert!(matches!(mapped, RendezvousError::Transient(_)));
    }

    #[test]
    fn http_status_403_maps_to_permission_denied() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(StatusCode::FORBIDDEN))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

            let mapped: RendezvousError = InfraError::from(error).into();
            match mapped {
                RendezvousError::PermissionDenied(msg) => assert!(msg.contains("403")),
                other => panic!("expected permission denied, got {other:?}"),
            }
        });
    }
}
