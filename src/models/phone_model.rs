use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Persisted catalog value, keyed by part number in the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    pub capacity: String,
    pub color: String,
}

/// One purchasable SKU. Immutable once loaded from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhoneModel {
    code: String,
    display_name: String,
    price: Decimal,
    currency: String,
    capacity: String,
    color: String,
}

impl PhoneModel {
    pub fn from_entry(code: impl Into<String>, entry: CatalogEntry) -> Self {
        Self {
            code: code.into(),
            display_name: entry.name,
            price: entry.price,
            currency: entry.currency,
            capacity: entry.capacity,
            color: entry.color,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn capacity(&self) -> &str {
        &self.capacity
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// "iPhone 16 Pro - Black Titanium (256GB)"
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.display_name, self.color, self.capacity)
    }

    pub fn formatted_price(&self) -> String {
        format!("{} {}", self.currency, self.price)
    }
}

/// Models selected for a monitoring session, in the caller's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchList {
    models: Vec<PhoneModel>,
}

impl WatchList {
    pub fn new(models: Vec<PhoneModel>) -> Self {
        Self { models }
    }

    /// Keep only the listed part numbers, preserving `models` order.
    /// Every requested code must exist in `models`.
    pub fn select(models: Vec<PhoneModel>, codes: &[String]) -> crate::Result<Self> {
        if let Some(missing) = codes
            .iter()
            .find(|code| !models.iter().any(|m| m.code() == code.as_str()))
        {
            return Err(crate::AppError::Validation(format!(
                "Unknown model code: {}",
                missing
            )));
        }

        let selected = models
            .into_iter()
            .filter(|m| codes.iter().any(|code| code == m.code()))
            .collect();
        Ok(Self::new(selected))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PhoneModel> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<'a> IntoIterator for &'a WatchList {
    type Item = &'a PhoneModel;
    type IntoIter = std::slice::Iter<'a, PhoneModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}
