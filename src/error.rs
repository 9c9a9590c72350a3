//! Error type shared by the server, the client and the domain logic.
//!
//! Every variant renders a message that can be shown to the user as is,
//! which is how the UI surfaces failures (a transient toast).
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message")]
pub enum MarketError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("please sign in to continue")]
    Unauthorized,
    #[error("you are not allowed to do that")]
    Forbidden,
    #[error("{0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("network error: {0}")]
    Network(String),
}

pub type MarketResult<T> = Result<T, MarketError>;

impl MarketError {
    pub fn validation(msg: impl Into<String>) -> Self {
        MarketError::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        MarketError::NotFound(what.into())
    }
}

#[cfg(feature = "ssr")]
impl From<rusqlite::Error> for MarketError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => MarketError::NotFound("record".into()),
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                MarketError::Conflict("that record already exists".into())
            }
            other => MarketError::Database(other.to_string()),
        }
    }
}

impl From<std::io::Error> for MarketError {
    fn from(err: std::io::Error) -> Self {
        MarketError::Storage(err.to_string())
    }
}

impl From<gloo_net::Error> for MarketError {
    fn from(err: gloo_net::Error) -> Self {
        MarketError::Network(err.to_string())
    }
}

#[cfg(feature = "ssr")]
impl actix_web::ResponseError for MarketError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            MarketError::Validation(_) => StatusCode::BAD_REQUEST,
            MarketError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketError::Unauthorized => StatusCode::UNAUTHORIZED,
            MarketError::Forbidden => StatusCode::FORBIDDEN,
            MarketError::Conflict(_) => StatusCode::CONFLICT,
            MarketError::Storage(_) | MarketError::Database(_) | MarketError::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(self.status_code()).json(self)
    }
}
