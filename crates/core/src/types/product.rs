//! Catalog and stock records.
//!
//! Both are read-only views of data owned by the remote store API. Field
//! names match the API's JSON so the records deserialize without mapping.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog ID.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
}

/// Units of a product currently available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

impl Stock {
    /// Whether `requested` units can be taken from this stock.
    #[must_use]
    pub fn covers(&self, requested: i64) -> bool {
        requested <= i64::from(self.amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_api_json() {
        let json = r#"{
            "id": 1,
            "title": "Tênis de Caminhada Leve Confortável",
            "price": 179.9,
            "image": "https://example.com/shoe.jpg"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(17990));
    }

    #[test]
    fn test_stock_rejects_negative_amount() {
        assert!(serde_json::from_str::<Stock>(r#"{"id": 1, "amount": -1}"#).is_err());
    }

    #[test]
    fn test_stock_covers_boundary() {
        let stock = Stock {
            id: ProductId::new(1),
            amount: 3,
        };
        assert!(stock.covers(3));
        assert!(!stock.covers(4));
        assert!(stock.covers(-1));
    }
}
