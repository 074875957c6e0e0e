use std::future::Future;

use crate::error::AppError;
use crate::models::{
    Category, CategoryChanges, NewCategory, NewUser, Role, SearchField, User, UserChanges,
};

/// Persists and retrieves user accounts.
pub trait UserStore: Send + Sync + Clone {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    /// Users ordered by creation time, newest first.
    fn list(
        &self,
        offset: u64,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<User>, AppError>> + Send;

    fn count(&self) -> impl Future<Output = Result<u64, AppError>> + Send;

    /// Insert a new user. A duplicate email yields [`AppError::Conflict`].
    fn insert(&self, user: &NewUser) -> impl Future<Output = Result<User, AppError>> + Send;

    /// Apply a partial update. Returns the updated row, or `None` if it is gone.
    fn update(
        &self,
        id: i64,
        changes: &UserChanges,
    ) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn set_role(
        &self,
        id: i64,
        role: Role,
    ) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    /// Delete by id. Returns whether a row was removed.
    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Case-insensitive substring match on one column.
    fn search(
        &self,
        field: SearchField,
        value: &str,
    ) -> impl Future<Output = Result<Vec<User>, AppError>> + Send;
}

/// Persists and retrieves the category tree.
pub trait CategoryStore: Send + Sync + Clone {
    /// Insert a new category. A duplicate slug yields [`AppError::Conflict`].
    fn insert(
        &self,
        category: &NewCategory,
    ) -> impl Future<Output = Result<Category, AppError>> + Send;

    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Category>, AppError>> + Send;

    fn find_by_url(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Option<Category>, AppError>> + Send;

    /// All categories ordered by id.
    fn list(&self) -> impl Future<Output = Result<Vec<Category>, AppError>> + Send;

    fn children(&self, id: i64) -> impl Future<Output = Result<Vec<Category>, AppError>> + Send;

    /// Apply a partial update, returning `None` if the row is gone.
    ///
    /// A new `parent_id` is checked against the current tree atomically with
    /// the write: moving `id` under itself or one of its descendants yields
    /// [`AppError::BadRequest`] and changes nothing.
    fn update(
        &self,
        id: i64,
        changes: &CategoryChanges,
    ) -> impl Future<Output = Result<Option<Category>, AppError>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, AppError>> + Send;
}
