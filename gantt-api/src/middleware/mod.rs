/// Middleware modules for the API server
///
/// - `auth`: Bearer token authentication and the "caller required" gate
/// - `error_detail`: Development-only exposure of internal error messages

pub mod auth;
pub mod error_detail;
