/*
 * src/error.rs
 *
 * File for the core error taxonomy
 *
 * Purpose:
 *   A closed taxonomy of six error kinds with fixed propagation rules,
 *   carrying an error kind, message, and trace id for every failure
 *   surfaced to a caller (`thiserror`-derived, convertible into an HTTP
 *   response).
 *
 * Include:
 *   ErrorKind    - the closed taxonomy of failure categories
 *   AppError     - error type carrying a kind, message and trace id
 *   ApiResult    - Result alias used by controllers
 */

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Closed taxonomy of failure categories. Serialized in job records and
/// error bodies as an upper-snake-case tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
	NetworkError,
	UpstreamError,
	ValidationError,
	Timeout,
	InternalError,
	UnknownError,
}

impl ErrorKind {
	/// Whether a failure of this kind is worth a caller retrying.
	pub fn retryable(self) -> bool {
		matches!(self, ErrorKind::NetworkError | ErrorKind::UpstreamError | ErrorKind::Timeout)
	}

	fn status(self) -> StatusCode {
		match self {
			ErrorKind::NetworkError | ErrorKind::UpstreamError => StatusCode::BAD_GATEWAY,
			ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
			ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
			ErrorKind::InternalError | ErrorKind::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// Core error type. Never carries request bodies, secrets, or headers —
/// only a short operator-facing `message` and the pre-selected user-safe
/// i18n string live downstream of this (see `chatback`/`rse`).
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct AppError {
	pub kind: ErrorKind,
	pub message: String,
	pub trace_id: String,
}

impl AppError {
	pub fn new(kind: ErrorKind, message: impl Into<String>, trace_id: impl Into<String>) -> Self {
		Self { kind, message: message.into(), trace_id: trace_id.into() }
	}

	pub fn network(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
		Self::new(ErrorKind::NetworkError, message, trace_id)
	}

	pub fn upstream(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
		Self::new(ErrorKind::UpstreamError, message, trace_id)
	}

	pub fn validation(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
		Self::new(ErrorKind::ValidationError, message, trace_id)
	}

	pub fn timeout(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
		Self::new(ErrorKind::Timeout, message, trace_id)
	}

	pub fn internal(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
		Self::new(ErrorKind::InternalError, message, trace_id)
	}

	pub fn unknown(message: impl Into<String>, trace_id: impl Into<String>) -> Self {
		Self::new(ErrorKind::UnknownError, message, trace_id)
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	code: String,
	message: String,
	error_type: ErrorKind,
	trace_id: String,
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			code: format!("{:?}", self.kind),
			message: self.message,
			error_type: self.kind,
			trace_id: self.trace_id,
		};
		(self.kind.status(), Json(body)).into_response()
	}
}

pub type ApiResult<T> = std::result::Result<T, AppError>;
