use validator::Validate;

use crate::dto::{CreateCategoryDto, UpdateCategoryDto};
use crate::error::AppError;
use crate::models::{Category, CategoryChanges, NewCategory};
use crate::traits::CategoryStore;

/// Catalogue tree management.
///
/// Every category except the root has exactly one parent, and no category may
/// become its own ancestor.
pub struct CategoryService<S: CategoryStore> {
    store: S,
}

impl<S: CategoryStore> CategoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<Category, AppError> {
        dto.validate()?;

        let parent_id = dto.parent.id;
        if self.store.find_by_id(parent_id).await?.is_none() {
            return Err(AppError::category_not_found(parent_id));
        }
        self.ensure_url_free(&dto.url, None).await?;

        let category = self
            .store
            .insert(&NewCategory {
                title: dto.title,
                url: dto.url,
                description: dto.description,
                parent_id,
            })
            .await?;
        tracing::info!(category_id = category.id, parent_id, "category created");
        Ok(category)
    }

    pub async fn find_all(&self) -> Result<Vec<Category>, AppError> {
        self.store.list().await
    }

    pub async fn find_one(&self, id: i64) -> Result<Option<Category>, AppError> {
        self.store.find_by_id(id).await
    }

    pub async fn children(&self, id: i64) -> Result<Vec<Category>, AppError> {
        self.require(id).await?;
        self.store.children(id).await
    }

    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<Category, AppError> {
        dto.check()?;
        let current = self.require(id).await?;

        if let Some(url) = &dto.url {
            self.ensure_url_free(url, Some(id)).await?;
        }

        let parent_id = dto.parent.map(|p| p.id);
        if let Some(new_parent) = parent_id {
            if current.is_root() {
                return Err(AppError::BadRequest("The root category cannot be moved".into()));
            }
            self.require(new_parent).await?;
        }

        let changes = CategoryChanges {
            title: dto.title,
            url: dto.url,
            description: dto.description,
            parent_id,
        };
        let category = self
            .store
            .update(id, &changes)
            .await
            .inspect_err(|e| {
                if let (AppError::BadRequest(_), Some(new_parent)) = (e, parent_id) {
                    tracing::warn!(category_id = id, new_parent, "rejected cyclic move");
                }
            })?
            .ok_or_else(|| AppError::category_not_found(id))?;
        tracing::info!(category_id = id, "category updated");
        Ok(category)
    }

    /// Delete a leaf category. The root and categories with children stay.
    pub async fn remove(&self, id: i64) -> Result<(), AppError> {
        let category = self.require(id).await?;
        if category.is_root() {
            return Err(AppError::BadRequest("The root category cannot be deleted".into()));
        }
        if !self.store.children(id).await?.is_empty() {
            return Err(AppError::Conflict(format!(
                "Category {id} still has subcategories"
            )));
        }
        self.store.delete(id).await?;
        tracing::info!(category_id = id, "category deleted");
        Ok(())
    }

    async fn require(&self, id: i64) -> Result<Category, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::category_not_found(id))
    }

    async fn ensure_url_free(&self, url: &str, except: Option<i64>) -> Result<(), AppError> {
        match self.store.find_by_url(url).await? {
            Some(existing) if Some(existing.id) != except => Err(AppError::Conflict(format!(
                "Category url already in use: {url}"
            ))),
            _ => Ok(()),
        }
    }
}
