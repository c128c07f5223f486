//! User account use-case service.
//!
//! Password hashing is the caller's job; this service only checks the
//! plaintext bounds at registration and stores the hash it is given.

use super::{check_expected_version, ServiceResult};
use crate::model::user::{validate_email, NewUser, User, UserFilter, UserUpdate};
use crate::model::validation::Validator;
use crate::model::RecordId;
use crate::query::filters::{Filters, Metadata};
use crate::repo::{Record, UserLookup};

pub struct UserService<R: UserLookup> {
    repo: R,
}

impl<R: UserLookup> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a deactivated user.
    ///
    /// # Errors
    /// - `Validation` for a bad name, email or plaintext password.
    /// - `DuplicateValue { field: "email" }` when the email is taken.
    pub fn register_user(&self, input: NewUser, password_hash: Vec<u8>) -> ServiceResult<User> {
        let mut v = Validator::new();
        input.validate(&mut v);
        v.finish()?;

        let mut user = User::from_new(input, password_hash);
        let mut v = Validator::new();
        user.validate(&mut v);
        v.finish()?;

        self.repo.create(&mut user)?;
        Ok(user)
    }

    pub fn get_user(&self, id: RecordId) -> ServiceResult<User> {
        Ok(self.repo.get(id)?)
    }

    pub fn get_user_by_email(&self, email: &str) -> ServiceResult<User> {
        let mut v = Validator::new();
        validate_email(&mut v, email);
        v.finish()?;
        Ok(self.repo.get_by_email(email)?)
    }

    pub fn update_user(
        &self,
        id: RecordId,
        patch: UserUpdate,
        expected_version: Option<i32>,
    ) -> ServiceResult<User> {
        let mut user = self.repo.get(id)?;
        check_expected_version(expected_version, user.version)?;

        user.apply_update(patch);
        let mut v = Validator::new();
        user.validate(&mut v);
        v.finish()?;

        self.repo.update(&mut user)?;
        Ok(user)
    }

    pub fn delete_user(&self, id: RecordId) -> ServiceResult<()> {
        Ok(self.repo.delete(id)?)
    }

    pub fn list_users(
        &self,
        filter: &UserFilter,
        filters: &Filters,
    ) -> ServiceResult<(Vec<User>, Metadata)> {
        let mut v = Validator::new();
        filters.validate(&mut v);
        v.finish()?;
        User::TABLE.sort_clause(filters)?;
        Ok(self.repo.list(filter, filters)?)
    }
}
