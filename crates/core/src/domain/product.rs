use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DecodeError;

pub const MAX_RATING: u8 = 5;
pub const MAX_SALE_PCT: u8 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A catalog item as owned by the remote catalog service.
///
/// Instances are only built through [`TryFrom<ProductRecord>`], so every
/// field has passed range validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub external_id: Option<String>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub rating: u8,
    pub in_stock: bool,
    pub image: String,
    pub sale_pct: Option<u8>,
}

impl Product {
    pub fn is_on_sale(&self) -> bool {
        matches!(self.sale_pct, Some(pct) if pct > 0)
    }

    /// Price after applying the sale percentage, rounded to cents.
    pub fn discounted_price(&self) -> Decimal {
        match self.sale_pct {
            Some(pct) if pct > 0 => {
                let remaining = Decimal::from(MAX_SALE_PCT - pct.min(MAX_SALE_PCT));
                (self.price * remaining / Decimal::from(MAX_SALE_PCT)).round_dp(2)
            }
            _ => self.price,
        }
    }

    pub fn stock_label(&self) -> &'static str {
        if self.in_stock {
            "In Stock"
        } else {
            "Out of Stock"
        }
    }

    pub fn rating_stars(&self) -> String {
        "*".repeat(usize::from(self.rating.min(MAX_RATING)))
    }
}

/// Wire shape of a catalog record, decoded structurally before validation.
#[derive(Clone, Debug, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "_id")]
    pub record_id: String,
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: serde_json::Number,
    pub rating: serde_json::Number,
    #[serde(rename = "inStock")]
    pub in_stock: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub sale: Option<serde_json::Number>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = DecodeError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let record_id = record.record_id.trim().to_owned();
        if record_id.is_empty() {
            return Err(DecodeError::field(None, "_id", "identifier must not be empty"));
        }
        let owner = Some(record_id.as_str());

        if record.name.trim().is_empty() {
            return Err(DecodeError::field(owner, "name", "display name must not be empty"));
        }

        let price = decimal_from_number(&record.price)
            .ok_or_else(|| DecodeError::field(owner, "price", "price must be a finite number"))?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(DecodeError::field(owner, "price", "price must not be negative"));
        }

        let rating = bounded_integer(&record.rating, MAX_RATING).ok_or_else(|| {
            DecodeError::field(owner, "rating", format!("rating must be an integer in 0..={MAX_RATING}"))
        })?;

        let sale_pct = match &record.sale {
            Some(sale) => Some(bounded_integer(sale, MAX_SALE_PCT).ok_or_else(|| {
                DecodeError::field(owner, "sale", format!("sale must be an integer in 0..={MAX_SALE_PCT}"))
            })?),
            None => None,
        };

        Ok(Product {
            id: ProductId(record_id),
            external_id: record.id.filter(|value| !value.trim().is_empty()),
            name: record.name,
            description: record.description,
            price,
            rating,
            in_stock: record.in_stock,
            image: record.image,
            sale_pct,
        })
    }
}

pub fn decode_catalog(bytes: &[u8]) -> Result<Vec<Product>, DecodeError> {
    let records: Vec<ProductRecord> = serde_json::from_slice(bytes).map_err(DecodeError::body)?;
    records.into_iter().map(Product::try_from).collect()
}

pub fn decode_product(bytes: &[u8]) -> Result<Product, DecodeError> {
    let record: ProductRecord = serde_json::from_slice(bytes).map_err(DecodeError::body)?;
    Product::try_from(record)
}

fn decimal_from_number(number: &serde_json::Number) -> Option<Decimal> {
    let raw = number.to_string();
    Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw)).ok()
}

fn bounded_integer(number: &serde_json::Number, max: u8) -> Option<u8> {
    let value = match number.as_u64() {
        Some(value) => value,
        None => {
            let float = number.as_f64()?;
            if float.fract() != 0.0 || float < 0.0 {
                return None;
            }
            float as u64
        }
    };
    u8::try_from(value).ok().filter(|value| *value <= max)
}
