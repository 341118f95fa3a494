//! Category management page

use std::sync::Arc;

use shared::filters::{apply_filters, CategoryFilter};
use shared::models::{build_category_tree, Category, CategoryNode, CategoryRequest};
use shared::validation::{validate_category_form, FormErrors};

use super::settle;
use crate::error::{ClientError, ClientResult};
use crate::notify::Notifier;
use crate::services::{CategoryService, Services};

pub struct CategoriesView {
    service: CategoryService,
    notifier: Arc<dyn Notifier>,
    categories: Vec<Category>,
    filter: CategoryFilter,
}

impl CategoriesView {
    pub fn new(services: &Services, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service: services.categories.clone(),
            notifier,
            categories: Vec::new(),
            filter: CategoryFilter::default(),
        }
    }

    pub async fn reload(&mut self) -> bool {
        let result = self.service.get_all().await;
        match settle(self.notifier.as_ref(), "Could not load categories", result) {
            Some(categories) => {
                self.categories = categories;
                true
            }
            None => false,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn find(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Categories that can be chosen as a parent
    pub fn top_level(&self) -> Vec<&Category> {
        self.categories.iter().filter(|c| c.is_top_level()).collect()
    }

    pub fn tree(&self) -> Vec<CategoryNode> {
        build_category_tree(&self.categories)
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    pub fn filtered(&self) -> Vec<Category> {
        apply_filters(&self.categories, &self.filter)
    }

    pub async fn create(&mut self, form: &CategoryRequest) -> Option<Category> {
        let result = self.try_create(form).await;
        let created = settle(self.notifier.as_ref(), "Could not create category", result)?;
        self.notifier.success(&format!("Category \"{}\" created", created.name));
        self.reload().await;
        Some(created)
    }

    async fn try_create(&self, form: &CategoryRequest) -> ClientResult<Category> {
        let form = form.normalized();
        validate_category_form(&form, &self.categories)?;
        self.ensure_unique_name(&form.name).await?;
        self.service.create(&form).await
    }

    pub async fn update(&mut self, id: i64, form: &CategoryRequest) -> Option<Category> {
        let result = self.try_update(id, form).await;
        let updated = settle(self.notifier.as_ref(), "Could not update category", result)?;
        self.notifier.success(&format!("Category \"{}\" updated", updated.name));
        self.reload().await;
        Some(updated)
    }

    async fn try_update(&self, id: i64, form: &CategoryRequest) -> ClientResult<Category> {
        let form = form.normalized();
        validate_category_form(&form, &self.categories)?;

        if form.parent_id == Some(id) {
            let mut errors = FormErrors::new();
            errors.add("idCategoriaPadre", "A category cannot be its own parent");
            return Err(errors.into());
        }

        let renamed = self
            .find(id)
            .map_or(true, |current| !current.name.eq_ignore_ascii_case(&form.name));
        if renamed {
            self.ensure_unique_name(&form.name).await?;
        }

        self.service.update(id, &form).await
    }

    async fn ensure_unique_name(&self, name: &str) -> ClientResult<()> {
        if self.service.exists_by_name(name).await? {
            return Err(ClientError::Rejected(format!(
                "A category named \"{}\" already exists",
                name
            )));
        }
        Ok(())
    }

    /// Delete a category that has no subcategories and no articles
    pub async fn delete(&mut self, id: i64) -> bool {
        let result = self.try_delete(id).await;
        if settle(self.notifier.as_ref(), "Could not delete category", result).is_none() {
            return false;
        }
        self.notifier.success("Category deleted");
        self.reload().await;
        true
    }

    async fn try_delete(&self, id: i64) -> ClientResult<()> {
        let (has_children, has_articles) = tokio::try_join!(
            self.service.has_subcategories(id),
            self.service.has_articles(id)
        )?;

        if has_children {
            return Err(ClientError::Rejected(
                "The category has subcategories and cannot be deleted".to_string(),
            ));
        }
        if has_articles {
            return Err(ClientError::Rejected(
                "The category has articles and cannot be deleted".to_string(),
            ));
        }
        self.service.delete(id).await
    }
}
