//! User account record model.
//!
//! # Responsibility
//! - Define the persisted user shape plus registration and patch inputs.
//! - Validate names, email format and plaintext password bounds.
//!
//! # Invariants
//! - `email` is unique across users, compared case-insensitively by the store.
//! - `password_hash` is opaque here; hashing happens before records are built.

use super::validation::{matches, Validator, EMAIL_RX};
use super::RecordId;
use serde::{Deserialize, Serialize};

pub const USER_SORT_SAFELIST: &[&str] = &["id", "name", "email", "-id", "-name", "-email"];

const NAME_MAX_BYTES: usize = 500;
const PASSWORD_MIN_BYTES: usize = 8;
const PASSWORD_MAX_BYTES: usize = 72;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: RecordId,
    /// Epoch milliseconds; serialized as RFC 3339.
    #[serde(serialize_with = "super::serialize_epoch_ms")]
    pub created_at: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: Vec<u8>,
    pub activated: bool,
    #[serde(skip)]
    pub version: i32,
}

/// Registration input. `password` is plaintext and only used for validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<Vec<u8>>,
    pub activated: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Plain-text name query; empty matches every user.
    pub name: String,
}

impl User {
    /// New users always start deactivated.
    pub fn from_new(input: NewUser, password_hash: Vec<u8>) -> Self {
        Self {
            name: input.name,
            email: input.email,
            password_hash,
            activated: false,
            ..Self::default()
        }
    }

    pub fn apply_update(&mut self, input: UserUpdate) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(email) = input.email {
            self.email = email;
        }
        if let Some(password_hash) = input.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(activated) = input.activated {
            self.activated = activated;
        }
    }

    pub fn validate(&self, v: &mut Validator) {
        validate_name(v, &self.name);
        validate_email(v, &self.email);
        // Empty hash: the caller skipped hashing.
        v.check(
            !self.password_hash.is_empty(),
            "password",
            "hash must be set",
        );
    }
}

impl NewUser {
    pub fn validate(&self, v: &mut Validator) {
        validate_name(v, &self.name);
        validate_email(v, &self.email);
        validate_password_plaintext(v, &self.password);
    }
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(
        matches(email, &EMAIL_RX),
        "email",
        "must be a valid email address",
    );
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(
        password.len() >= PASSWORD_MIN_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        password.len() <= PASSWORD_MAX_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}

fn validate_name(v: &mut Validator, name: &str) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(
        name.len() <= NAME_MAX_BYTES,
        "name",
        "must not be more than 500 bytes long",
    );
}
