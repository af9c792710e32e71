//! Unified service-layer error type
//!
//! `ServiceError` bridges storage errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`), so order operations can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::orders::TransitionError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: storage/infrastructure errors (auto-logged, mapped to DatabaseError)
/// - `App`: business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<TransitionError> for ServiceError {
    fn from(e: TransitionError) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl ServiceError {
    /// Error code this error will surface with
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::App(e) => e.code,
            ServiceError::Db(_) => ErrorCode::DatabaseError,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
