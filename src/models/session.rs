// src/models/session.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::{
    error::AppError,
    utils::hash::{hash_password, verify_password},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("wrong admin password")]
    WrongPassword,
}

/// The admin password, held only as an Argon2 hash.
#[derive(Clone)]
pub struct AdminCredential {
    password_hash: String,
}

impl AdminCredential {
    /// Hashes the configured plaintext password. The plaintext is not kept.
    pub fn from_plaintext(password: &str) -> Result<Self, AppError> {
        Ok(Self {
            password_hash: hash_password(password)?,
        })
    }

    pub fn matches(&self, candidate: &str) -> bool {
        // A malformed stored hash counts as a mismatch.
        verify_password(candidate, &self.password_hash).unwrap_or(false)
    }
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminCredential(..)")
    }
}

/// Authentication state of one visiting client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminSession {
    #[default]
    LoggedOut,
    LoggedIn,
}

impl AdminSession {
    /// `LoggedOut -> LoggedIn` on a correct password.
    ///
    /// A wrong password yields `AuthError::WrongPassword`; the caller keeps
    /// its current state in that case.
    pub fn authenticate(
        self,
        password: &str,
        credential: &AdminCredential,
    ) -> Result<AdminSession, AuthError> {
        if credential.matches(password) {
            Ok(AdminSession::LoggedIn)
        } else {
            Err(AuthError::WrongPassword)
        }
    }

    pub fn logout(self) -> AdminSession {
        AdminSession::LoggedOut
    }

    pub fn is_authenticated(self) -> bool {
        self == AdminSession::LoggedIn
    }
}

/// DTO for admin login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 128, message = "Admin password is required."))]
    pub password: String,
}
