//! Unified gateway error model and classification helpers.
//! One enum is shared by the invoker, the catalog inspector and the HTTP
//! surface, along with a mapper from database-driver faults and a mapping
//! to HTTP status codes.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayError {
    NotFound { code: String, message: String },
    Database { code: String, message: String },
    System { code: String, message: String },
}

impl GatewayError {
    pub fn code_str(&self) -> &str {
        match self {
            GatewayError::NotFound { code, .. }
            | GatewayError::Database { code, .. }
            | GatewayError::System { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            GatewayError::NotFound { message, .. }
            | GatewayError::Database { message, .. }
            | GatewayError::System { message, .. } => message.as_str(),
        }
    }

    pub fn not_found<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { GatewayError::NotFound { code: code.into(), message: msg.into() } }
    pub fn database<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { GatewayError::Database { code: code.into(), message: msg.into() } }
    pub fn system<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { GatewayError::System { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::NotFound { .. } => 404,
            GatewayError::Database { .. } => 422,
            GatewayError::System { .. } => 500,
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for GatewayError {}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<anyhow::Error> for GatewayError {
    fn from(err: anyhow::Error) -> Self {
        GatewayError::System { code: "system_error".into(), message: err.to_string() }
    }
}

/// Classify a fault raised by the database driver during execution.
/// Anything the engine itself reported keeps the engine's message verbatim as
/// a database error; everything else (socket setup, IO, protocol) is a system
/// error. Both are terminal for the current operation.
pub fn classify_db(err: tokio_postgres::Error) -> GatewayError {
    match err.as_db_error() {
        Some(db) => GatewayError::database("db_error", db.message()),
        None => GatewayError::system("system_error", err.to_string()),
    }
}
