//! Error handling for the inventory management backend
//!
//! Every failure maps to a distinct HTTP status with a message naming the
//! affected record and quantity.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{OrderStatus, StockTarget};
use thiserror::Error;

use crate::services::reconciliation::ReconciliationReport;
use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Lifecycle errors
    #[error("Order {0} is cancelled")]
    OrderCancelled(uuid::Uuid),

    #[error("Status conflict: expected {expected}, found {actual}")]
    StatusConflict {
        expected: OrderStatus,
        actual: OrderStatus,
        report: Option<ReconciliationReport>,
    },

    #[error("Insufficient stock: cannot decrease {target} by {requested}")]
    InsufficientStock {
        target: StockTarget,
        requested: i64,
        report: Option<ReconciliationReport>,
    },

    #[error("Stock record missing: cannot increase {target} by {requested}")]
    StockRecordMissing {
        target: StockTarget,
        requested: i64,
        report: Option<ReconciliationReport>,
    },

    // Store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Attach the state of a partially applied stock plan
    pub fn with_report(self, new_report: ReconciliationReport) -> Self {
        match self {
            AppError::InsufficientStock { target, requested, .. } => AppError::InsufficientStock {
                target,
                requested,
                report: Some(new_report),
            },
            AppError::StockRecordMissing { target, requested, .. } => AppError::StockRecordMissing {
                target,
                requested,
                report: Some(new_report),
            },
            AppError::StatusConflict { expected, actual, .. } => AppError::StatusConflict {
                expected,
                actual,
                report: Some(new_report),
            },
            other => other,
        }
    }

    pub fn report(&self) -> Option<&ReconciliationReport> {
        match self {
            AppError::InsufficientStock { report, .. }
            | AppError::StockRecordMissing { report, .. }
            | AppError::StatusConflict { report, .. } => report.as_ref(),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<ReconciliationReport>,
}

impl ErrorDetail {
    fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
            field: None,
            reconciliation: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, mut error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::OrderCancelled(id) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "ORDER_CANCELLED",
                    format!("Cannot insert items into order {}, it is already cancelled", id),
                ),
            ),
            AppError::StatusConflict { expected, actual, .. } => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "STATUS_CONFLICT",
                    format!("Expected status {} but the order is {}", expected, actual),
                ),
            ),
            AppError::InsufficientStock { target, requested, .. } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "INSUFFICIENT_STOCK",
                    format!(
                        "Failed to decrease {} {} by {}: insufficient stock or record missing",
                        target.kind, target.id, requested
                    ),
                ),
            ),
            AppError::StockRecordMissing { target, requested, .. } => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "STOCK_RECORD_MISSING",
                    format!(
                        "Failed to increase {} {} by {}: record not found",
                        target.kind, target.id, requested
                    ),
                ),
            ),
            AppError::Store(StoreError::Timeout(after)) => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorDetail::new(
                    "STORE_TIMEOUT",
                    format!("Store call exceeded its deadline of {:?}", after),
                ),
            ),
            AppError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("STORE_ERROR", "A store error occurred".to_string()),
            ),
        };
        error_detail.reconciliation = self.report().cloned();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
