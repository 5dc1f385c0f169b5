use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Insufficient stock for item(s): {}", .0.join(", "))]
    InsufficientStock(Vec<String>),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Turn constraint violations into validation failures; anything else stays a storage error.
    pub fn from_write(err: DbErr, what: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::BadRequest(format!("{what} already exists"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::BadRequest(format!("{what} references a missing or in-use record"))
            }
            _ => AppError::OrmError(err),
        }
    }

    /// Like `from_write`, but a row that vanished before the update is `NotFound`.
    pub fn from_update(err: DbErr, subject: &str, what: &str) -> Self {
        match err {
            DbErr::RecordNotUpdated => AppError::NotFound(subject.to_string()),
            other => AppError::from_write(other, what),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::DbError(err) => tracing::error!(error = %err, "database error"),
            AppError::OrmError(err) => tracing::error!(error = %err, "orm error"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal error"),
            _ => tracing::debug!(status = %status, error = %self, "request rejected"),
        }

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_names_every_item() {
        let err = AppError::InsufficientStock(vec!["id1".into(), "id3".into()]);
        assert_eq!(err.to_string(), "Insufficient stock for item(s): id1, id3");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_errors_map_to_500() {
        let err = AppError::OrmError(DbErr::Custom("boom".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "ORM error");
    }

    #[test]
    fn vanished_row_on_update_is_not_found() {
        let err = AppError::from_update(DbErr::RecordNotUpdated, "Item id4", "An item with this SKU");
        assert!(matches!(err, AppError::NotFound(ref subject) if subject == "Item id4"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = AppError::from_update(DbErr::Custom("boom".into()), "Item id4", "An item with this SKU");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_carries_the_subject() {
        let err = AppError::NotFound("Order ORD1".into());
        assert_eq!(err.to_string(), "Order ORD1 not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
