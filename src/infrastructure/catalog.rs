//! YAML-backed store catalog implementing the context provider port
//!
//! ```yaml
//! stores:
//!   1: { name: Demo Store, base_url: "https://shop.example.com/", locale: en_US }
//! products:
//!   42:
//!     sku: TEE-42
//!     name: Linen Tee
//!     price: 29.5
//!     short_description: "<p>Breathable linen</p>"
//! categories:
//!   7: { name: Shirts, description: Summer shirts, products: [Linen Tee] }
//! ```

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::core::{CatalogContext, ContextProvider, DataSource, DataSourceKind, StoreScope};

/// Category context lists at most this many product names
pub const MAX_CATEGORY_PRODUCTS: usize = 10;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreEntry {
    pub name: Option<String>,
    pub base_url: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductEntry {
    pub sku: Option<Value>,
    pub name: Option<String>,
    pub price: Option<Value>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryEntry {
    pub name: Option<String>,
    pub description: Option<String>,
    pub products: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    stores: HashMap<Value, StoreEntry>,
    products: HashMap<Value, ProductEntry>,
    categories: HashMap<Value, CategoryEntry>,
}

/// Store, product and category data loaded from a YAML file
#[derive(Debug, Clone, Default)]
pub struct YamlCatalog {
    stores: HashMap<String, StoreEntry>,
    products: HashMap<String, ProductEntry>,
    categories: HashMap<String, CategoryEntry>,
}

impl YamlCatalog {
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_yaml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            stores = catalog.stores.len(),
            products = catalog.products.len(),
            categories = catalog.categories.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: CatalogFile = serde_yaml::from_str(content)?;
        Ok(Self {
            stores: keyed_by_id(file.stores),
            products: keyed_by_id(file.products),
            categories: keyed_by_id(file.categories),
        })
    }

    /// `Store Name`, `Base URL` and `Locale` lines for the scope
    pub fn store_context(&self, scope: StoreScope) -> String {
        match self.stores.get(&scope.to_string()) {
            Some(store) => render_fields(&[
                ("Store Name", store.name.clone()),
                ("Base URL", store.base_url.clone()),
                ("Locale", store.locale.clone()),
            ]),
            None => {
                tracing::warn!(store = %scope, "Store not found in catalog");
                format!("(Note: Could not retrieve context data for Store ID {scope})")
            }
        }
    }

    /// Context text for a product or category
    pub fn data_source_context(&self, source: &DataSource, scope: StoreScope) -> String {
        let rendered = match source.kind {
            DataSourceKind::Product => self.products.get(&source.id).map(product_context),
            DataSourceKind::Category => self
                .categories
                .get(&source.id)
                .map(|category| category_context(&source.id, category)),
        };

        rendered.unwrap_or_else(|| {
            tracing::warn!(store = %scope, source = %source, "Catalog entry not found");
            format!(
                "(Note: Could not retrieve context data for {} ID {} in Store ID {})",
                source.kind, source.id, scope
            )
        })
    }
}

#[async_trait]
impl ContextProvider for YamlCatalog {
    async fn build_context(
        &self,
        source: Option<&DataSource>,
        scope: StoreScope,
    ) -> CatalogContext {
        CatalogContext {
            store_context: self.store_context(scope),
            data_source_context: source
                .map(|source| self.data_source_context(source, scope))
                .unwrap_or_default(),
        }
    }
}

fn keyed_by_id<T>(entries: HashMap<Value, T>) -> HashMap<String, T> {
    entries
        .into_iter()
        .filter_map(|(key, entry)| scalar_text(&key).map(|id| (id, entry)))
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn product_context(product: &ProductEntry) -> String {
    render_fields(&[
        ("SKU", product.sku.as_ref().and_then(scalar_text)),
        ("Product Name", product.name.clone()),
        ("Price", product.price.as_ref().and_then(scalar_text)),
        ("Short Description", product.short_description.clone()),
        ("Full Description", product.description.clone()),
        ("Meta Description", product.meta_description.clone()),
    ])
}

fn category_context(id: &str, category: &CategoryEntry) -> String {
    let products = category
        .products
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .take(MAX_CATEGORY_PRODUCTS)
        .collect::<Vec<_>>()
        .join(", ");

    render_fields(&[
        ("Category ID", Some(id.to_string())),
        ("Category Name", category.name.clone()),
        ("Description", category.description.clone()),
        ("Products in this category include", Some(products)),
    ])
}

/// `Label: value` lines, skipping values that are empty once tags are stripped
fn render_fields(fields: &[(&str, Option<String>)]) -> String {
    fields
        .iter()
        .filter_map(|(label, value)| {
            let text = strip_tags(value.as_deref()?);
            (!text.is_empty()).then(|| format!("{label}: {text}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_tags(input: &str) -> String {
    HTML_TAG.replace_all(input, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
stores:
  1:
    name: Demo Store
    base_url: "https://shop.example.com/"
    locale: en_US
  "2":
    name: Second Store
    locale: ""
products:
  42:
    sku: TEE-42
    name: Linen Tee
    price: 29.5
    short_description: "<p>Breathable <b>linen</b></p>"
    description: ""
categories:
  7:
    name: Shirts
    description: "<div>Summer shirts</div>"
    products: [A, B, C, D, E, F, G, H, I, J, K, L]
  8:
    name: Empty
"#;

    fn catalog() -> YamlCatalog {
        YamlCatalog::from_yaml_str(CATALOG).unwrap()
    }

    #[test]
    fn test_store_context() {
        let catalog = catalog();
        assert_eq!(
            catalog.store_context(StoreScope(1)),
            "Store Name: Demo Store\nBase URL: https://shop.example.com/\nLocale: en_US"
        );
        assert_eq!(catalog.store_context(StoreScope(2)), "Store Name: Second Store");
        assert_eq!(
            catalog.store_context(StoreScope(9)),
            "(Note: Could not retrieve context data for Store ID 9)"
        );
    }

    #[test]
    fn test_product_context_strips_tags_and_skips_empty() {
        let context = catalog()
            .data_source_context(&DataSource::new(DataSourceKind::Product, "42"), StoreScope(1));
        assert_eq!(
            context,
            "SKU: TEE-42\nProduct Name: Linen Tee\nPrice: 29.5\nShort Description: Breathable linen"
        );
    }

    #[test]
    fn test_category_context_limits_products() {
        let context = catalog()
            .data_source_context(&DataSource::new(DataSourceKind::Category, "7"), StoreScope(1));
        assert_eq!(
            context,
            "Category ID: 7\nCategory Name: Shirts\nDescription: Summer shirts\n\
             Products in this category include: A, B, C, D, E, F, G, H, I, J"
        );

        let context = catalog()
            .data_source_context(&DataSource::new(DataSourceKind::Category, "8"), StoreScope(1));
        assert_eq!(context, "Category ID: 8\nCategory Name: Empty");
    }

    #[test]
    fn test_missing_entry_placeholder() {
        let context = catalog()
            .data_source_context(&DataSource::new(DataSourceKind::Product, "404"), StoreScope(3));
        assert_eq!(
            context,
            "(Note: Could not retrieve context data for product ID 404 in Store ID 3)"
        );
    }

    #[test]
    fn test_empty_and_invalid_files() {
        let empty = YamlCatalog::from_yaml_str("").unwrap();
        assert!(empty.store_context(StoreScope(1)).starts_with("(Note:"));

        assert!(matches!(
            YamlCatalog::from_yaml_str("stores: [1, 2"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_build_context() {
        let catalog = catalog();
        let context = catalog.build_context(None, StoreScope(1)).await;
        assert!(context.store_context.starts_with("Store Name: Demo Store"));
        assert!(context.data_source_context.is_empty());

        let source = DataSource::new(DataSourceKind::Product, "42");
        let context = catalog.build_context(Some(&source), StoreScope(1)).await;
        assert!(context.data_source_context.starts_with("SKU: TEE-42"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, CATALOG).unwrap();

        let catalog = YamlCatalog::load(&path).await.unwrap();
        assert_eq!(catalog.store_context(StoreScope(2)), "Store Name: Second Store");

        let missing = YamlCatalog::load(&dir.path().join("nope.yaml")).await;
        assert!(matches!(missing, Err(CatalogError::Io { .. })));
    }
}
