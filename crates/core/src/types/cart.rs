//! The cart: an ordered list of line items, one per product.
//!
//! [`Cart`] is an immutable snapshot. Every transition (`with_appended`,
//! `with_amount`, `without`) builds a new cart and leaves the receiver as it
//! was, so a snapshot handed to a reader never changes underneath it.
//!
//! ## Invariants
//!
//! - At most one [`CartItem`] per [`ProductId`]
//! - Every item has `amount >= 1`
//! - Insertion order is preserved; updates never reorder
//!
//! Deserialization enforces the invariants, so a corrupted mirror is
//! rejected rather than loaded.

use serde::{Deserialize, Serialize, Serializer};

use super::{Price, Product, ProductId};

/// Errors raised when a list of items violates the cart invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartInvariantError {
    /// Two items share a product ID.
    #[error("product {0} appears more than once")]
    DuplicateItem(ProductId),
    /// An item has an amount of zero.
    #[error("product {0} has a zero amount")]
    ZeroAmount(ProductId),
}

/// One product entry in the cart with its chosen quantity.
///
/// Serializes as the catalog record plus an `amount` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub amount: u32,
}

impl CartItem {
    /// A fresh line for `product` with a single unit.
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount: 1,
        }
    }

    /// A copy of this item carrying a different amount.
    #[must_use]
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}

/// Ordered collection of line items for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from items, checking the invariants.
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate product ID or a zero amount.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartInvariantError> {
        for (index, item) in items.iter().enumerate() {
            if item.amount == 0 {
                return Err(CartInvariantError::ZeroAmount(item.id));
            }
            if items.iter().take(index).any(|earlier| earlier.id == item.id) {
                return Err(CartInvariantError::DuplicateItem(item.id));
            }
        }
        Ok(Self { items })
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// Find the item for a product, if it is in the cart.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.find(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all item amounts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// A new cart with `item` at the end.
    ///
    /// If the product is already present its entry is replaced in place, so
    /// the uniqueness invariant holds whatever the caller passes.
    #[must_use]
    pub fn with_appended(&self, item: CartItem) -> Self {
        let mut items = self.items.clone();
        if let Some(slot) = items.iter_mut().find(|existing| existing.id == item.id) {
            *slot = item;
        } else {
            items.push(item);
        }
        Self { items }
    }

    /// A new cart where the product's amount is `amount`.
    ///
    /// Returns `None` if the product is not in the cart or `amount` is zero.
    /// Removal goes through [`Cart::without`].
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Self> {
        if amount == 0 || !self.contains(id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    item.with_amount(amount)
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(Self { items })
    }

    /// A new cart without the product.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        Some(Self { items })
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartInvariantError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, amount: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            title: format!("Shoe {id}"),
            price: Price::from_units(100),
            image: format!("https://example.com/{id}.jpg"),
            amount,
        }
    }

    #[test]
    fn test_with_appended_keeps_receiver_untouched() {
        let cart = Cart::from_items(vec![item(1, 1)]).unwrap();
        let next = cart.with_appended(item(2, 1));

        assert_eq!(cart.len(), 1);
        assert_eq!(next.len(), 2);
        assert_eq!(next.items()[1].id, ProductId::new(2));
    }

    #[test]
    fn test_with_appended_replaces_existing_in_place() {
        let cart = Cart::from_items(vec![item(1, 1), item(2, 1)]).unwrap();
        let next = cart.with_appended(item(1, 4));

        let ids: Vec<i32> = next.iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(next.find(ProductId::new(1)).unwrap().amount, 4);
    }

    #[test]
    fn test_with_amount_preserves_order() {
        let cart = Cart::from_items(vec![item(1, 1), item(2, 1), item(3, 1)]).unwrap();
        let next = cart.with_amount(ProductId::new(2), 5).unwrap();

        let ids: Vec<i32> = next.iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(next.find(ProductId::new(2)).unwrap().amount, 5);
        assert_eq!(cart.find(ProductId::new(2)).unwrap().amount, 1);
    }

    #[test]
    fn test_with_amount_zero_is_rejected() {
        let cart = Cart::from_items(vec![item(1, 2)]).unwrap();
        assert!(cart.with_amount(ProductId::new(1), 0).is_none());
        assert_eq!(cart.find(ProductId::new(1)).unwrap().amount, 2);
    }

    #[test]
    fn test_with_amount_missing_item() {
        let cart = Cart::new();
        assert!(cart.with_amount(ProductId::new(1), 2).is_none());
    }

    #[test]
    fn test_without() {
        let cart = Cart::from_items(vec![item(1, 1), item(2, 2)]).unwrap();
        let next = cart.without(ProductId::new(1)).unwrap();

        assert_eq!(next.items(), &[item(2, 2)]);
        assert!(next.without(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_total_quantity() {
        let cart = Cart::from_items(vec![item(1, 2), item(2, 3)]).unwrap();
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_serializes_as_json_array() {
        let cart = Cart::from_items(vec![item(1, 2)]).unwrap();
        let json = serde_json::to_value(&cart).unwrap();

        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["title"], "Shoe 1");
        assert_eq!(json[0]["amount"], 2);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let json = serde_json::to_string(&vec![item(1, 1), item(1, 2)]).unwrap();
        assert!(serde_json::from_str::<Cart>(&json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_zero_amount() {
        let json = serde_json::to_string(&vec![item(1, 0)]).unwrap();
        assert!(serde_json::from_str::<Cart>(&json).is_err());
    }

    #[test]
    fn test_deserialize_accepts_numeric_price() {
        let json = r#"[{"id":1,"title":"Shoe","price":100,"image":"x.jpg","amount":1}]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.items()[0].price, Price::from_units(100));
    }
}
