use serde::Serialize;
use validator::Validate;

use crate::dto::{CreateUserDto, LoginDto, UpdateRoleUserDto, UpdateUserDto};
use crate::error::AppError;
use crate::models::{NewUser, Page, PageRequest, Role, SearchField, User, UserChanges};
use crate::password::{hash_password_async, verify_password_async};
use crate::token::{Requester, TokenKeys};
use crate::traits::UserStore;

/// A user together with a freshly signed session token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

/// Account management: signup, lookups, self-service updates and admin actions.
///
/// Holds no per-request state; construct one per request from the shared store
/// and keys.
pub struct UserService<S: UserStore> {
    store: S,
    keys: TokenKeys,
}

impl<S: UserStore> UserService<S> {
    pub fn new(store: S, keys: TokenKeys) -> Self {
        Self { store, keys }
    }

    /// Register a new account and sign a session token for it.
    pub async fn create(&self, dto: CreateUserDto) -> Result<AuthenticatedUser, AppError> {
        dto.validate()?;

        if self.store.find_by_email(&dto.email).await?.is_some() {
            tracing::info!(email = %dto.email, "signup rejected, email taken");
            return Err(AppError::Conflict("User already exist".into()));
        }

        let password_hash = hash_password_async(dto.password).await?;
        let user = self
            .store
            .insert(&NewUser {
                email: dto.email,
                password_hash,
                role: Role::User,
                name: dto.name,
                surname: dto.surname,
                phone: dto.phone,
            })
            .await?;

        let token = self.keys.sign(&user)?;
        tracing::info!(user_id = user.id, "user created");
        Ok(AuthenticatedUser { user, token })
    }

    /// Check credentials and sign a session token.
    pub async fn login(&self, dto: LoginDto) -> Result<AuthenticatedUser, AppError> {
        dto.validate()?;
        let invalid = || AppError::Unauthorized("Invalid credentials".into());

        let user = self.store.find_by_email(&dto.email).await?.ok_or_else(invalid)?;
        if !verify_password_async(dto.password, user.password.clone()).await? {
            tracing::warn!(user_id = user.id, "login with wrong password");
            return Err(invalid());
        }

        let token = self.keys.sign(&user)?;
        Ok(AuthenticatedUser { user, token })
    }

    pub async fn find_one(&self, email: &str) -> Result<Option<User>, AppError> {
        self.store.find_by_email(email).await
    }

    /// Look up a user. Non-admins always get their own record, whatever `id` is.
    pub async fn find_by_id(
        &self,
        id: i64,
        requester: &Requester,
    ) -> Result<Option<User>, AppError> {
        self.store.find_by_id(requester.resolve_target(id)).await
    }

    /// The requester's own record.
    pub async fn profile(&self, requester: &Requester) -> Result<User, AppError> {
        self.store
            .find_by_id(requester.id)
            .await?
            .ok_or_else(AppError::user_not_found)
    }

    pub async fn find_all(&self, page: u32, limit: u32) -> Result<Page<User>, AppError> {
        let request = PageRequest::new(page, limit)?;
        let users = self.store.list(request.offset(), request.limit).await?;
        let total = self.store.count().await?;
        Ok(Page::new(users, total, request))
    }

    /// Apply a partial update with the same admin/self substitution as
    /// [`find_by_id`](Self::find_by_id).
    ///
    /// Returns the record as it was *before* the update.
    pub async fn update_user(
        &self,
        id: i64,
        dto: UpdateUserDto,
        requester: &Requester,
    ) -> Result<User, AppError> {
        dto.validate()?;
        let target = requester.resolve_target(id);

        let existing = self
            .store
            .find_by_id(target)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        if let Some(email) = &dto.email
            && email != &existing.email
            && self.store.find_by_email(email).await?.is_some()
        {
            return Err(AppError::Conflict("Email already in use".into()));
        }

        let password_hash = match dto.password {
            Some(plain) => Some(hash_password_async(plain).await?),
            None => None,
        };
        let changes = UserChanges {
            email: dto.email,
            password_hash,
            name: dto.name,
            surname: dto.surname,
            phone: dto.phone,
        };

        if !changes.is_empty() {
            self.store.update(target, &changes).await?;
            tracing::info!(user_id = target, requester = requester.id, "user updated");
        }
        Ok(existing)
    }

    /// Delete a user by the raw `id`, without admin/self substitution.
    pub async fn delete_user(&self, id: i64, requester: &Requester) -> Result<bool, AppError> {
        if self.store.find_by_id(id).await?.is_none() {
            return Err(AppError::user_not_found());
        }
        self.store.delete(id).await?;
        tracing::info!(user_id = id, requester = requester.id, "user deleted");
        Ok(true)
    }

    pub async fn update_role(
        &self,
        dto: UpdateRoleUserDto,
        id: i64,
        requester: &Requester,
    ) -> Result<User, AppError> {
        if self.store.find_by_id(id).await?.is_none() {
            return Err(AppError::user_not_found());
        }
        let user = self
            .store
            .set_role(id, dto.role)
            .await?
            .ok_or_else(AppError::user_not_found)?;
        tracing::info!(user_id = id, role = %dto.role, requester = requester.id, "role updated");
        Ok(user)
    }

    /// Case-insensitive substring search on one allow-listed field.
    pub async fn search_by_field(&self, field: &str, value: &str) -> Result<Vec<User>, AppError> {
        let field: SearchField = field.parse()?;
        self.store.search(field, value).await
    }
}
