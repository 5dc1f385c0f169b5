use crate::{config::AdminCredentials, dto::auth::LoginRequest};

/// Static credential check. This is a placeholder gate for the front end, not a security boundary.
pub fn check_credentials(expected: &AdminCredentials, attempt: &LoginRequest) -> bool {
    attempt.username == expected.username && attempt.password == expected.password
}
