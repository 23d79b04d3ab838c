/*
 * src/controllers/mod.rs
 *
 * File for the HTTP controller layer
 *
 * Purpose:
 *   The HTTP surfaces of the search engine: one module per resource,
 *   a `*_routes()` factory function returning a sub-router, merged
 *   under a shared prefix in `main.rs`.
 *
 * Include:
 *   search   - POST /search, GET /search/{requestId}/result
 *   health   - GET /healthz
 */

pub mod health;
pub mod search;
