use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

extern crate log;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced to HTTP clients by the web layer.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: WebErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    Auth(AuthErrorKind),
}

#[derive(Debug, PartialEq)]
pub enum AuthErrorKind {
    /// No `Authorization: Bearer` header on a gated request.
    MissingToken,
    /// The token failed signature or claim validation.
    InvalidToken,
    /// The server has no signing secret, so no token can be valid.
    NotConfigured,
}

impl Error {
    pub fn auth(kind: AuthErrorKind) -> Self {
        Self {
            source: None,
            error_kind: WebErrorKind::Auth(kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{:?}", self.error_kind)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.error_kind {
            WebErrorKind::Auth(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: WebErrorKind::Auth(AuthErrorKind::InvalidToken),
        }
    }
}
