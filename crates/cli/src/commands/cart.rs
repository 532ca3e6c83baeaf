//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rocket-cart show
//!
//! # Add one unit of product 1
//! rocket-cart add 1
//!
//! # Set product 1 to three units
//! rocket-cart update 1 3
//!
//! # Remove product 1
//! rocket-cart remove 1
//! ```
//!
//! # Environment Variables
//!
//! - `CART_API_URL` - Base URL of the stock/catalog API
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart

use std::sync::Arc;

use rocket_shoes_cart::{
    ApiClient, CartConfig, CartError, CartStore, ClientError, Collaborators, FileStore,
    TracingObserver,
};
use rocket_shoes_core::{Cart, ProductId};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// API client could not be built.
    #[error("API client error: {0}")]
    Client(#[from] ClientError),

    /// Cart operation was rejected.
    #[error("{}", .0.user_message())]
    Cart(#[from] CartError),
}

/// Build a store wired to the configured API and storage directory.
///
/// # Errors
///
/// Returns an error if the API client cannot be built.
pub async fn open(config: &CartConfig) -> Result<CartStore, CommandError> {
    let api = Arc::new(ApiClient::new(&config.api)?);
    info!(
        api = %config.api.base_url,
        storage = %config.storage_dir.display(),
        "Opening cart"
    );

    Ok(CartStore::load(
        Collaborators {
            stock: api.clone(),
            catalog: api,
            store: Arc::new(FileStore::new(&config.storage_dir)),
            observer: Arc::new(TracingObserver),
        },
        config.store_options(),
    )
    .await)
}

/// Print the current cart.
pub fn show(store: &CartStore) {
    print_cart(&store.cart());
}

/// Add one unit of a product and print the result.
///
/// # Errors
///
/// Returns the classified failure if the cart rejected the change.
pub async fn add(store: &CartStore, id: ProductId) -> Result<(), CommandError> {
    store.add_product(id).await?;
    print_cart(&store.cart());
    Ok(())
}

/// Remove a product and print the result.
///
/// # Errors
///
/// Returns the classified failure if the cart rejected the change.
pub async fn remove(store: &CartStore, id: ProductId) -> Result<(), CommandError> {
    store.remove_product(id).await?;
    print_cart(&store.cart());
    Ok(())
}

/// Set a product's amount and print the result.
///
/// # Errors
///
/// Returns the classified failure if the cart rejected the change.
pub async fn update(store: &CartStore, id: ProductId, amount: i64) -> Result<(), CommandError> {
    store.update_product_amount(id, amount).await?;
    print_cart(&store.cart());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    for line in render(cart) {
        println!("{line}");
    }
}

/// Lines describing the cart, one per item plus a footer.
fn render(cart: &Cart) -> Vec<String> {
    if cart.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut lines: Vec<String> = cart
        .iter()
        .map(|item| {
            format!(
                "{:>4}  {:<40}  {:>10}  x{}",
                item.id, item.title, item.price, item.amount
            )
        })
        .collect();
    lines.push(format!(
        "{} item(s), {} unit(s)",
        cart.len(),
        cart.total_quantity()
    ));
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocket_shoes_core::{CartItem, Price};

    use super::*;

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&Cart::new()), vec!["Cart is empty".to_string()]);
    }

    #[test]
    fn test_render_items() {
        let cart = Cart::from_items(vec![CartItem {
            id: ProductId::new(1),
            title: "Shoe".to_string(),
            price: Price::from_units(100),
            image: "shoe.jpg".to_string(),
            amount: 2,
        }])
        .unwrap();

        let lines = render(&cart);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Shoe"));
        assert!(lines[0].contains("$100.00"));
        assert!(lines[0].ends_with("x2"));
        assert_eq!(lines[1], "1 item(s), 2 unit(s)");
    }

    #[test]
    fn test_command_error_shows_user_message() {
        let err = CommandError::from(CartError::ItemNotFound(ProductId::new(1)));
        assert_eq!(err.to_string(), "Product is not in the cart");
    }
}
