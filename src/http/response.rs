//! Response construction and error mapping.
//!
//! # Responsibilities
//! - Map parse, lookup and store failures to HTTP status codes
//! - Build redirect responses with the configured status
//!
//! # Design Decisions
//! - Both "not an ARK" and "unknown NAAN" are plain-text 404s
//! - Store failures are 500 and logged; clients never see store paths

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::ark::{ParseError, ResolveError};

/// Errors surfaced by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("invalid redirect location {0:?}")]
    InvalidLocation(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Parse(_) | AppError::Resolve(ResolveError::UnknownNaan(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Resolve(ResolveError::Store(_)) | AppError::InvalidLocation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Parse(_) => "Not found.".to_string(),
            AppError::Resolve(ResolveError::UnknownNaan(naan)) => format!("NAAN {naan} not found."),
            AppError::Resolve(ResolveError::Store(e)) => {
                tracing::error!(error = %e, "Record store failure");
                "Record store unavailable.".to_string()
            }
            AppError::InvalidLocation(_) => {
                tracing::error!(error = %self, "Cannot build redirect");
                "Invalid redirect target.".to_string()
            }
        };
        (status, message).into_response()
    }
}

/// A redirect to `location` with the given 3xx status.
pub fn redirect(status: StatusCode, location: &str) -> Result<Response, AppError> {
    let value = HeaderValue::from_str(location)
        .map_err(|_| AppError::InvalidLocation(location.to_string()))?;
    Ok((status, [(header::LOCATION, value)]).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(ParseError::NotAnArk("hello/world".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ResolveError::UnknownNaan("99999".into())).status(),
            StatusCode::NOT_FOUND
        );
        let store = StoreError::InvalidRecord {
            naan: "12345".into(),
            reason: "bad".into(),
        };
        assert_eq!(
            AppError::from(ResolveError::from(store)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_redirect_sets_location() {
        let res = redirect(StatusCode::FOUND, "https://example.org/ark:/12345/x").unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            "https://example.org/ark:/12345/x"
        );
    }

    #[test]
    fn test_redirect_rejects_control_characters() {
        assert!(matches!(
            redirect(StatusCode::FOUND, "https://e.org/\n"),
            Err(AppError::InvalidLocation(_))
        ));
    }
}
