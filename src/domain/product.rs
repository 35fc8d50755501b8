//! Products and the dual id space they live in.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::category::Category;
use crate::error::{PosError, Result};

/// A product identifier. Seeded and locally-added products carry small
/// numeric ids; products that exist in the remote store carry the opaque
/// string id the store assigned. Lookup and update paths branch on this
/// explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Local(u32),
    Remote(String),
}

impl ProductId {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// The id as the string used in purchase items and store documents.
    pub fn as_key(&self) -> String {
        match self {
            Self::Local(n) => n.to_string(),
            Self::Remote(s) => s.clone(),
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(n) => write!(f, "{n}"),
            Self::Remote(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for ProductId {
    fn from(value: u32) -> Self {
        Self::Local(value)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::Remote(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Category,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        category: impl Into<Category>,
        price: Decimal,
    ) -> Self {
        let name = name.into();
        let category = category.into();
        let image = Some(derive_image(&name));
        Self {
            id: id.into(),
            name,
            category,
            price,
            image,
            created_at: None,
            updated_at: None,
        }
    }

    /// Case-insensitive, whitespace-trimmed name match.
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(other.trim())
    }

    /// Sort key used everywhere an ordered catalog is produced.
    pub fn ordering_key(&self) -> (u16, String) {
        (self.category.rank(), self.name.to_lowercase())
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// Input for creating a product.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: Category,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PosError::Validation("product name is required".into()));
        }
        if self.price < Decimal::ZERO {
            return Err(PosError::Validation(format!(
                "price must not be negative, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

/// Partial product update; also the shape of an overlay edit entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProductPatch {
    pub fn price(price: Decimal) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.image.is_none()
    }

    /// Apply onto a product, refreshing the derived image when the name or
    /// category changed and no explicit image was given.
    pub fn apply_to(&self, product: &mut Product) {
        let renamed = self
            .name
            .as_ref()
            .map(|n| *n != product.name)
            .unwrap_or(false);
        let recategorized = self
            .category
            .as_ref()
            .map(|c| *c != product.category)
            .unwrap_or(false);
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(image) = &self.image {
            product.image = Some(image.clone());
        } else if renamed || recategorized {
            product.image = Some(derive_image(&product.name));
        }
    }
}

/// Image lookup key: first whitespace-delimited token of the name,
/// lower-cased, stripped of non-alphanumerics.
pub fn image_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect::<String>()
        .trim()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Default image path derived from the product name.
pub fn derive_image(name: &str) -> String {
    format!("/images/{}.jpg", image_key(name))
}
