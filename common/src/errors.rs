//! Error taxonomy shared by all services.
//!
//! Every failure path of the database administration operations ends in
//! exactly one [`AppError`] variant. Remote causes are carried as strings so
//! the driver's own error types never cross the service boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Result alias used throughout the services.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database name argument was missing or empty.
    #[error("Database name is empty")]
    EmptyDatabaseName,

    /// Create requested for a name already present on the server.
    #[error("DB with name [{0}] ALREADY EXISTS")]
    DuplicateDatabase(String),

    /// Drop or stats requested for a name absent from the server.
    #[error("DB with name [{0}] DOES NOT EXIST")]
    UndefinedDatabase(String),

    #[error("DB_CREATION_EXCEPTION: {0}")]
    DatabaseCreation(String),

    #[error("DB_DELETION_EXCEPTION: {0}")]
    DatabaseDeletion(String),

    #[error("GET_DB_LIST_EXCEPTION: {0}")]
    DatabaseList(String),

    #[error("GET_DB_STATS_EXCEPTION: {0}")]
    DatabaseStats(String),

    /// Local failure while shaping stats output.
    #[error("JSON_EXCEPTION: {0}")]
    Encoding(String),

    /// Session key could not be bound to a live connection.
    #[error("Connection unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Stable error code for client handling.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::EmptyDatabaseName => "EMPTY_DB_NAME",
            AppError::DuplicateDatabase(_) => "DB_ALREADY_EXISTS",
            AppError::UndefinedDatabase(_) => "UNDEFINED_DATABASE",
            AppError::DatabaseCreation(_) => "DB_CREATION_EXCEPTION",
            AppError::DatabaseDeletion(_) => "DB_DELETION_EXCEPTION",
            AppError::DatabaseList(_) => "GET_DB_LIST_EXCEPTION",
            AppError::DatabaseStats(_) => "GET_DB_STATS_EXCEPTION",
            AppError::Encoding(_) => "JSON_EXCEPTION",
            AppError::ConnectionUnavailable(_) => "CONNECTION_UNAVAILABLE",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status the error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EmptyDatabaseName | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateDatabase(_) => StatusCode::CONFLICT,
            AppError::UndefinedDatabase(_) => StatusCode::NOT_FOUND,
            AppError::ConnectionUnavailable(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseCreation(_)
            | AppError::DatabaseDeletion(_)
            | AppError::DatabaseList(_)
            | AppError::DatabaseStats(_)
            | AppError::Encoding(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "request rejected");
        }

        let body = ApiResponse::err(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_message_mentions_empty() {
        let msg = AppError::EmptyDatabaseName.to_string();
        assert!(msg.to_lowercase().contains("empty"));
    }

    #[test]
    fn test_business_errors_map_to_client_status() {
        assert_eq!(AppError::EmptyDatabaseName.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::DuplicateDatabase("shop".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::UndefinedDatabase("ghost".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_remote_failures_map_to_server_status() {
        let err = AppError::DatabaseDeletion("socket closed".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "DB_DELETION_EXCEPTION");
        assert!(err.to_string().contains("socket closed"));
    }

    #[test]
    fn test_messages_name_the_database() {
        assert_eq!(
            AppError::DuplicateDatabase("shop".into()).to_string(),
            "DB with name [shop] ALREADY EXISTS"
        );
        assert_eq!(
            AppError::UndefinedDatabase("ghost".into()).to_string(),
            "DB with name [ghost] DOES NOT EXIST"
        );
    }
}
