/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: HS256 access tokens
/// - [`middleware`]: Axum middleware turning a bearer token into an `AuthContext`
///
/// # Example
///
/// ```no_run
/// use gantt_shared::auth::password::{hash_password, verify_password};
/// use gantt_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("admin123")?;
/// assert!(verify_password("admin123", &hash)?);
///
/// let token = create_token(&Claims::new(1, "admin"), "secret-key-that-is-at-least-32-bytes")?;
/// let claims = validate_token(&token, "secret-key-that-is-at-least-32-bytes")?;
/// assert_eq!(claims.sub, 1);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
