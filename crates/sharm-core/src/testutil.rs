//! Test utilities: in-memory implementations of the store traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, so a test can keep
//! a clone of the store and inspect it after the service has run.

use std::sync::{Arc, Mutex};

use chrono::{TimeDelta, Utc};

use crate::error::AppError;
use crate::models::{
    Category, CategoryChanges, NewCategory, NewUser, ROOT_CATEGORY_ID, Role, SearchField, User,
    UserChanges,
};
use crate::token::Requester;
use crate::traits::{CategoryStore, UserStore};

pub fn requester_for(user: &User) -> Requester {
    Requester {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    }
}

// ---------------------------------------------------------------------------
// MockUserStore
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockUserStore {
    users: Arc<Mutex<Vec<User>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockUserStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert a user directly. Each seed is one second newer than the last.
    pub fn seed(&self, email: &str, role: Role) -> User {
        let id = self.allocate_id();
        let created_at = Utc::now() + TimeDelta::seconds(id);
        let user = User {
            id,
            email: email.to_string(),
            password: "not-a-hash".to_string(),
            role,
            name: format!("Name{id}"),
            surname: format!("Surname{id}"),
            phone: None,
            created_at,
            updated_at: created_at,
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn get(&self, id: i64) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn remove(&self, id: i64) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn allocate_id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }
}

impl UserStore for MockUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.get(id))
    }

    async fn list(&self, offset: u64, limit: u32) -> Result<Vec<User>, AppError> {
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.len() as u64)
    }

    async fn insert(&self, new: &NewUser) -> Result<User, AppError> {
        if self.find_by_email(&new.email).await?.is_some() {
            return Err(AppError::Conflict("User already exist".into()));
        }
        let id = self.allocate_id();
        let now = Utc::now() + TimeDelta::seconds(id);
        let user = User {
            id,
            email: new.email.clone(),
            password: new.password_hash.clone(),
            role: new.role,
            name: new.name.clone(),
            surname: new.surname.clone(),
            phone: new.phone.clone(),
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            changes.apply_to(user);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_role(&self, id: i64, role: Role) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }

    async fn search(&self, field: SearchField, value: &str) -> Result<Vec<User>, AppError> {
        let needle = value.to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| {
                field
                    .value_of(u)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MockCategoryStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockCategoryStore {
    categories: Arc<Mutex<Vec<Category>>>,
}

impl MockCategoryStore {
    /// A tree holding only the root, as left by the migrations.
    pub fn with_root() -> Self {
        let root = Category {
            id: ROOT_CATEGORY_ID,
            title: "Catalog".to_string(),
            url: "root".to_string(),
            description: None,
            parent_id: None,
            created_at: Utc::now(),
        };
        Self {
            categories: Arc::new(Mutex::new(vec![root])),
        }
    }
}

impl CategoryStore for MockCategoryStore {
    async fn insert(&self, new: &NewCategory) -> Result<Category, AppError> {
        let mut categories = self.categories.lock().unwrap();
        if categories.iter().any(|c| c.url == new.url) {
            return Err(AppError::Conflict("Category url already in use".into()));
        }
        let id = categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let category = Category {
            id,
            title: new.title.clone(),
            url: new.url.clone(),
            description: new.description.clone(),
            parent_id: Some(new.parent_id),
            created_at: Utc::now(),
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, AppError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Category>, AppError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.url == url)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, AppError> {
        let mut all = self.categories.lock().unwrap().clone();
        all.sort_by_key(|c| c.id);
        Ok(all)
    }

    async fn children(&self, id: i64) -> Result<Vec<Category>, AppError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.parent_id == Some(id))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: i64,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, AppError> {
        let mut categories = self.categories.lock().unwrap();
        if let Some(new_parent) = changes.parent_id {
            let mut cursor = Some(new_parent);
            while let Some(current) = cursor {
                if current == id {
                    return Err(AppError::category_cycle(id, new_parent));
                }
                cursor = categories
                    .iter()
                    .find(|c| c.id == current)
                    .and_then(|c| c.parent_id);
            }
        }
        Ok(categories.iter_mut().find(|c| c.id == id).map(|category| {
            changes.apply_to(category);
            category.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        Ok(categories.len() != before)
    }
}
