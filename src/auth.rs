//! Login check for the dashboard.
//!
//! The capability is injected so the user table lives in configuration,
//! not in code. No sessions are issued; the presentation layer only asks
//! whether a username/password pair is valid.

use std::collections::HashMap;

pub trait Authenticator: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Credential table sourced from [`AppConfig::users`](crate::config::AppConfig)
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
    users: HashMap<String, String>,
}

impl StaticAuthenticator {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }
}

impl Authenticator for StaticAuthenticator {
    fn verify(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(expected) => constant_time_eq(expected.as_bytes(), password.as_bytes()),
            None => false,
        }
    }
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
