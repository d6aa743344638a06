use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::{Document, DocumentFilter, RepositoryError, RepositoryResult};

/// Collection holding menu items
pub const MENU_COLLECTION: &str = "menuitem";

/// Menu item as stored and seeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub is_featured: bool,
}

/// Menu item as returned to API clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemOut {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub is_featured: bool,
}

/// Optional filters for menu queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuFilter {
    pub category: Option<String>,
    pub featured: Option<bool>,
}

impl MenuFilter {
    pub fn new(category: Option<String>, featured: Option<bool>) -> Self {
        // An empty category means "no category filter"
        let category = category.filter(|c| !c.is_empty());
        Self { category, featured }
    }

    /// Build the store-level equality filter
    pub fn to_document_filter(&self) -> DocumentFilter {
        let mut filter = DocumentFilter::new();
        if let Some(ref category) = self.category {
            filter = filter.with("category", category.clone());
        }
        if let Some(featured) = self.featured {
            filter = filter.with("is_featured", featured);
        }
        filter
    }
}

impl MenuItem {
    /// Deterministic document id for a menu item, keyed by its name
    pub fn document_id(&self) -> String {
        format!("menu-{}", slugify(&self.name))
    }

    /// Check whether the item satisfies the given filters
    pub fn matches_filter(&self, filter: &MenuFilter) -> bool {
        if let Some(ref category) = filter.category {
            if &self.category != category {
                return false;
            }
        }
        if let Some(featured) = filter.featured {
            if self.is_featured != featured {
                return false;
            }
        }
        true
    }

    /// Convert to a store document
    pub fn to_document(&self) -> RepositoryResult<Document> {
        let price: Number = self.price.normalize().to_string().parse()?;

        let mut document = Document::new();
        document.insert("name".to_string(), Value::String(self.name.clone()));
        if let Some(ref description) = self.description {
            document.insert(
                "description".to_string(),
                Value::String(description.clone()),
            );
        }
        document.insert("price".to_string(), Value::Number(price));
        document.insert("category".to_string(), Value::String(self.category.clone()));
        document.insert("is_featured".to_string(), Value::Bool(self.is_featured));
        Ok(document)
    }

    pub fn to_response(&self) -> MenuItemOut {
        MenuItemOut {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.to_f64().unwrap_or_default(),
            category: self.category.clone(),
            is_featured: self.is_featured,
        }
    }
}

impl MenuItemOut {
    /// Map a stored document into the response shape.
    ///
    /// `price` is coerced to a float from a number or numeric string and
    /// `is_featured` to a boolean, defaulting to false when missing.
    pub fn from_document(document: &Document) -> RepositoryResult<Self> {
        let name = document
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RepositoryError::InvalidDocument {
                message: "Missing name".to_string(),
            })?
            .to_string();

        let category = document
            .get("category")
            .and_then(Value::as_str)
            .ok_or_else(|| RepositoryError::InvalidDocument {
                message: "Missing category".to_string(),
            })?
            .to_string();

        let price = document
            .get("price")
            .and_then(coerce_f64)
            .ok_or_else(|| RepositoryError::InvalidDocument {
                message: "Invalid price".to_string(),
            })?;

        let description = document
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);

        let is_featured = document
            .get("is_featured")
            .map(coerce_bool)
            .unwrap_or(false);

        Ok(Self {
            name,
            description,
            price,
            category,
            is_featured,
        })
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    }
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to `-`
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// The canonical sample menu, used both for seeding and as fallback data
pub fn sample_menu() -> Vec<MenuItem> {
    vec![
        MenuItem {
            name: "Iced Latte".to_string(),
            description: Some("Double shot espresso with cold milk over ice".to_string()),
            price: dec!(5.5),
            category: "Coffee".to_string(),
            is_featured: true,
        },
        MenuItem {
            name: "Tropical Smoothie".to_string(),
            description: Some("Pineapple, mango, coconut water".to_string()),
            price: dec!(6.5),
            category: "Smoothie".to_string(),
            is_featured: true,
        },
        MenuItem {
            name: "Avocado Toast".to_string(),
            description: Some("Sourdough, smashed avo, chili flakes, lemon".to_string()),
            price: dec!(9.0),
            category: "Brunch".to_string(),
            is_featured: false,
        },
        MenuItem {
            name: "Blueberry Muffin".to_string(),
            description: Some("Baked daily, crumb topping".to_string()),
            price: dec!(3.5),
            category: "Pastry".to_string(),
            is_featured: false,
        },
        MenuItem {
            name: "Cold Brew".to_string(),
            description: Some("Slow steeped, smooth and bold".to_string()),
            price: dec!(4.75),
            category: "Coffee".to_string(),
            is_featured: true,
        },
    ]
}
