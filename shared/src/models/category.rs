//! Category models and the category tree

use serde::{Deserialize, Serialize};

/// Minimal category reference embedded in other payloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRef {
    #[serde(rename = "idCategoria")]
    pub id: i64,
    #[serde(rename = "denominacion")]
    pub name: String,
    #[serde(rename = "esSubcategoria", default)]
    pub is_subcategory: bool,
}

/// Category summary attached to products
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryInfo {
    #[serde(rename = "idCategoria")]
    pub id: i64,
    #[serde(rename = "denominacion")]
    pub name: String,
    #[serde(rename = "esSubcategoria", default)]
    pub is_subcategory: bool,
    #[serde(rename = "categoriaPadre", default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

/// A product/ingredient category with at most one level of subcategories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    #[serde(rename = "idCategoria")]
    pub id: i64,
    #[serde(rename = "denominacion")]
    pub name: String,
    #[serde(rename = "esSubcategoria", default)]
    pub is_subcategory: bool,
    #[serde(rename = "categoriaPadre", default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CategoryRef>,
    #[serde(rename = "subcategorias", default)]
    pub children: Vec<CategoryRef>,
    #[serde(rename = "cantidadArticulos", default, skip_serializing_if = "Option::is_none")]
    pub article_count: Option<u32>,
}

impl Category {
    pub fn parent_id(&self) -> Option<i64> {
        self.parent.as_ref().map(|p| p.id)
    }

    pub fn is_top_level(&self) -> bool {
        !self.is_subcategory && self.parent.is_none()
    }
}

/// Payload for creating or updating a category
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRequest {
    #[serde(rename = "denominacion")]
    pub name: String,
    #[serde(rename = "esSubcategoria")]
    pub is_subcategory: bool,
    #[serde(rename = "idCategoriaPadre", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

impl CategoryRequest {
    /// Trimmed name; the parent is dropped for top-level categories
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            is_subcategory: self.is_subcategory,
            parent_id: if self.is_subcategory {
                self.parent_id
            } else {
                None
            },
        }
    }
}

/// A node of the category tree
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
    pub level: u32,
}

/// Build the category tree from a flat list.
///
/// Only top-level categories accept children, so the tree is at most two
/// levels deep. A category whose parent is unknown or is itself a
/// subcategory is kept at the root rather than dropped. Source order is
/// preserved at every level.
pub fn build_category_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let accepts_children = |id: i64| {
        categories
            .iter()
            .any(|c| c.id == id && !c.is_subcategory && c.parent.is_none())
    };

    let mut roots: Vec<CategoryNode> = Vec::new();
    let mut nested: Vec<(i64, Category)> = Vec::new();

    for category in categories {
        match category.parent_id() {
            Some(parent_id) if accepts_children(parent_id) => {
                nested.push((parent_id, category.clone()));
            }
            _ => roots.push(CategoryNode {
                category: category.clone(),
                children: Vec::new(),
                level: 0,
            }),
        }
    }

    for (parent_id, category) in nested {
        if let Some(parent) = roots.iter_mut().find(|n| n.category.id == parent_id) {
            parent.children.push(CategoryNode {
                category,
                children: Vec::new(),
                level: 1,
            });
        }
    }

    roots
}
