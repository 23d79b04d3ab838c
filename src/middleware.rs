/*
 * src/middleware.rs
 *
 * File for request-scoped extractors
 *
 * Purpose:
 *   Two cross-cutting request concerns that every controller needs:
 *   the `x-session-id` correlation header (tolerated absent — ephemeral
 *   session) and a `traceId` that every error body must carry. Modeled
 *   as Axum extractors the same way a request-scoped auth identity
 *   would be, minus the auth/cookie machinery (authentication is out of
 *   scope here).
 */

use axum::{
	extract::FromRequestParts,
	http::{StatusCode, request::Parts},
};
use uuid::Uuid;

pub const SESSION_HEADER: &str = "x-session-id";

/// The session id correlating a request to `SessionContext` state.
/// Auto-generated when the header is absent — absence is tolerated and
/// just means an ephemeral session.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl<S> FromRequestParts<S> for SessionId
where
	S: Send + Sync,
{
	type Rejection = (StatusCode, &'static str);

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let header = parts
			.headers
			.get(SESSION_HEADER)
			.and_then(|v| v.to_str().ok())
			.map(str::to_string);

		Ok(match header {
			Some(raw) if !raw.trim().is_empty() => SessionId(raw),
			_ => SessionId(format!("sess_{}", Uuid::new_v4())),
		})
	}
}

/// A per-request trace id, generated once at the front door and threaded
/// through to every error body and log line.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl<S> FromRequestParts<S> for TraceId
where
	S: Send + Sync,
{
	type Rejection = (StatusCode, &'static str);

	async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(TraceId(format!("trace_{}", Uuid::new_v4())))
	}
}
