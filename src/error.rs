use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::response::{ApiResponse, Meta};

const LOCK_NOT_AVAILABLE: &str = "55P03";
const DEADLOCK_DETECTED: &str = "40P01";
const SERIALIZATION_FAILURE: &str = "40001";
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

/// How a datastore failure should be reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFault {
    /// Lock timeout, deadlock or serialization failure.
    Contention,
    /// Pool exhausted or connection lost.
    Unavailable,
    UniqueViolation,
    ForeignKeyViolation,
    Other,
}

pub fn classify_sqlx(err: &sqlx::Error) -> StoreFault {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => StoreFault::Unavailable,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(LOCK_NOT_AVAILABLE | DEADLOCK_DETECTED | SERIALIZATION_FAILURE) => {
                StoreFault::Contention
            }
            Some(UNIQUE_VIOLATION) => StoreFault::UniqueViolation,
            Some(FOREIGN_KEY_VIOLATION) => StoreFault::ForeignKeyViolation,
            _ => StoreFault::Other,
        },
        _ => StoreFault::Other,
    }
}

pub fn classify_orm(err: &DbErr) -> StoreFault {
    match err {
        DbErr::ConnectionAcquire(_) => StoreFault::Unavailable,
        DbErr::Conn(RuntimeErr::SqlxError(e))
        | DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e)) => classify_sqlx(e),
        DbErr::Conn(_) => StoreFault::Unavailable,
        _ => StoreFault::Other,
    }
}

/// Payload of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorData {
    pub error: String,
    /// True for lock contention and datastore outages.
    pub retryable: bool,
}

impl AppError {
    fn store_fault(&self) -> Option<StoreFault> {
        match self {
            AppError::DbError(e) => Some(classify_sqlx(e)),
            AppError::OrmError(e) => Some(classify_orm(e)),
            _ => None,
        }
    }

    /// Whether the same request may succeed if sent again later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.store_fault(),
            Some(StoreFault::Contention | StoreFault::Unavailable)
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DbError(_) | AppError::OrmError(_) => match self.store_fault() {
                Some(StoreFault::Contention | StoreFault::UniqueViolation) => StatusCode::CONFLICT,
                Some(StoreFault::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
                Some(StoreFault::ForeignKeyViolation) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn public_message(&self) -> String {
        match self.store_fault() {
            Some(StoreFault::Contention) => "Record is busy, retry the request".to_string(),
            Some(StoreFault::Unavailable) => "Datastore unavailable".to_string(),
            Some(StoreFault::UniqueViolation) => "Duplicate value".to_string(),
            Some(StoreFault::ForeignKeyViolation) => {
                "Referenced record does not exist".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }
        let message = self.public_message();

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData {
                error: message,
                retryable: self.is_retryable(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnAcquireErr;

    #[test]
    fn business_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::NotFound("Order".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("number is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("destination occupied".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InvalidState("item is not sent".into()).status(),
            StatusCode::CONFLICT
        );
        assert!(!AppError::Conflict("active items present".into()).is_retryable());
    }

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(AppError::NotFound("Table".into()).to_string(), "Table not found");
    }

    #[test]
    fn pool_exhaustion_is_retryable_unavailable() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.is_retryable());

        let err = AppError::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.is_retryable());
    }

    #[test]
    fn unknown_orm_errors_are_internal() {
        let err = AppError::from(DbErr::RecordNotUpdated);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_retryable());
    }
}
