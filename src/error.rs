use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("validation error: {0}")]
	Validation(String),
	#[error("not found: {0}")]
	NotFound(String),
	#[error("duplicate key: {0}")]
	DuplicateKey(String),
	#[error("insufficient stock for {isbn}: requested {requested}, available {available}")]
	InsufficientStock {
		isbn: String,
		requested: i64,
		available: i64,
	},
	#[error("publisher order {0} is already confirmed")]
	AlreadyConfirmed(i64),
	#[error("invalid username or password")]
	InvalidCredentials,
	#[error("storage error: {0}")]
	Storage(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
	pub fn validation(msg: impl Into<String>) -> Self {
		StoreError::Validation(msg.into())
	}

	pub fn not_found(msg: impl Into<String>) -> Self {
		StoreError::NotFound(msg.into())
	}

	pub fn status(&self) -> StatusCode {
		match self {
			StoreError::Validation(_) => StatusCode::BAD_REQUEST,
			StoreError::NotFound(_) => StatusCode::NOT_FOUND,
			StoreError::DuplicateKey(_)
			| StoreError::InsufficientStock { .. }
			| StoreError::AlreadyConfirmed(_) => StatusCode::CONFLICT,
			StoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
			StoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<sqlx::Error> for StoreError {
	fn from(err: sqlx::Error) -> Self {
		match &err {
			sqlx::Error::RowNotFound => StoreError::not_found("no matching row"),
			sqlx::Error::Database(db) if db.is_unique_violation() => {
				StoreError::DuplicateKey(db.message().to_string())
			},
			sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
				StoreError::validation(format!("unknown reference: {}", db.message()))
			},
			sqlx::Error::Database(db) if db.is_check_violation() => {
				StoreError::validation(db.message().to_string())
			},
			_ => StoreError::Storage(err.to_string()),
		}
	}
}

impl IntoResponse for StoreError {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		} else {
			tracing::debug!(error = %self, "request rejected");
		}
		(status, Json(json!({ "error": self.to_string() }))).into_response()
	}
}
