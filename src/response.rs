//! Classification of transport responses.
//!
//! [`classify`] is pure: it performs no I/O and decides only what a
//! status/body pair amounts to. Absence (a 404) is a legitimate outcome,
//! not a failure, and is kept distinct from every error path.

use crate::{Error, Result};
use http::StatusCode;

/// What a transport response's status and body amount to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedBody {
    /// 404: the resource legitimately does not exist.
    Absent,
    /// A body ready for siren decoding.
    Body(String),
}

/// Classifies a status/body pair.
///
/// A 404 maps to [`ClassifiedBody::Absent`]. Any other status outside the
/// 2xx range is an [`Error::UnexpectedStatus`]. A 2xx response with an
/// empty or missing body is an [`Error::MalformedResponse`].
pub fn classify(status: StatusCode, body: Option<&str>) -> Result<ClassifiedBody> {
    if status == StatusCode::NOT_FOUND {
        return Ok(ClassifiedBody::Absent);
    }

    if !status.is_success() {
        return Err(Error::UnexpectedStatus { status });
    }

    match body {
        Some(text) if !text.is_empty() => Ok(ClassifiedBody::Body(text.to_owned())),
        _ => Err(Error::MalformedResponse {
            reason: "empty response content".to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_absent() {
        let classified = classify(StatusCode::NOT_FOUND, Some("ignored")).unwrap();
        assert_eq!(classified, ClassifiedBody::Absent);
    }

    #[test]
    fn out_of_range_status_is_rejected() {
        let err = classify(StatusCode::BAD_REQUEST, Some("{}")).unwrap_err();
        assert!(
            matches!(err, Error::UnexpectedStatus { status } if status == StatusCode::BAD_REQUEST)
        );

        let err = classify(StatusCode::BAD_GATEWAY, None).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn success_with_empty_body_is_malformed() {
        let err = classify(StatusCode::OK, Some("")).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));

        let err = classify(StatusCode::NO_CONTENT, None).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn success_with_body_passes_through() {
        let classified = classify(StatusCode::OK, Some(r#"{"class":["x"]}"#)).unwrap();
        assert_eq!(
            classified,
            ClassifiedBody::Body(r#"{"class":["x"]}"#.to_owned())
        );
    }
}
