//! Plain-text rendering of storefront pages.

use std::collections::BTreeSet;

use furnish_client::{ProductCard, SearchResults};
use furnish_core::catalog::CartSummary;
use furnish_core::domain::product::{Product, ProductId};
use rust_decimal::Decimal;

pub const NO_PRODUCTS: &str = "No furniture available";
pub const NO_DEALS: &str = "No deals available";
pub const NO_FAVORITES: &str = "No favorites yet\nStart saving items you love";
pub const EMPTY_CART: &str = "Your cart is empty\nStart adding some items to your cart";
pub const NO_RESULTS: &str = "No results found";

pub fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Current price, plus the list price and sale badge when discounted.
pub fn price_tag(product: &Product) -> String {
    match product.sale_pct {
        Some(pct) if product.is_on_sale() => format!(
            "{} (was {}, {pct}% OFF)",
            money(product.discounted_price()),
            money(product.price)
        ),
        _ => money(product.price),
    }
}

fn badges(card: &ProductCard) -> String {
    let mut badges = String::new();
    if card.favorite {
        badges.push_str(" [favorite]");
    }
    if card.in_cart {
        badges.push_str(" [in cart]");
    }
    badges
}

pub fn product_line(card: &ProductCard) -> String {
    let product = &card.product;
    format!(
        "{:<12} {}  {}  {:<5}  {}{}",
        product.id,
        product.name,
        price_tag(product),
        product.rating_stars(),
        product.stock_label(),
        badges(card)
    )
}

pub fn product_list(title: &str, cards: &[ProductCard], empty: &str) -> String {
    if cards.is_empty() {
        return empty.to_string();
    }

    let mut lines = vec![format!("{title} ({})", cards.len())];
    lines.extend(cards.iter().map(product_line));
    lines.join("\n")
}

pub fn product_detail(card: &ProductCard) -> String {
    let product = &card.product;
    let mut lines = vec![
        format!("{}{}", product.name, badges(card)),
        format!("id: {}", product.id),
        format!("price: {}", price_tag(product)),
        format!("rating: {} ({}/5)", product.rating_stars(), product.rating),
        format!("availability: {}", product.stock_label()),
    ];
    if !product.image.is_empty() {
        lines.push(format!("image: {}", product.image));
    }
    if !product.description.is_empty() {
        lines.push(String::new());
        lines.push(product.description.clone());
    }
    lines.join("\n")
}

pub fn cart(summary: &CartSummary) -> String {
    if summary.is_empty() {
        return EMPTY_CART.to_string();
    }

    let mut lines = vec![format!("Shopping Cart ({})", summary.item_count())];
    for line in &summary.lines {
        lines.push(format!(
            "{:<12} {}  {}  {}",
            line.product.id,
            line.product.name,
            money(line.unit_price),
            line.product.stock_label()
        ));
    }
    lines.push(String::new());
    lines.push("Order Summary".to_string());
    lines.push(format!("  Subtotal  {}", money(summary.subtotal)));
    let shipping =
        if summary.shipping.is_zero() { "Free".to_string() } else { money(summary.shipping) };
    lines.push(format!("  Shipping  {shipping}"));
    lines.push(format!("  Total     {}", money(summary.total)));
    lines.join("\n")
}

pub fn search_results(results: &SearchResults) -> String {
    if results.query.trim().is_empty() {
        return "Type a name to search furniture".to_string();
    }
    if results.products.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut lines = vec![format!("Results for `{}` ({})", results.query, results.products.len())];
    lines.extend(results.products.iter().map(|product| {
        format!("{:<12} {}  {}", product.id, product.name, price_tag(product))
    }));
    lines.join("\n")
}

/// Selected identifiers per store, for the session `saved` command.
pub fn saved(favorites: &BTreeSet<ProductId>, cart: &BTreeSet<ProductId>) -> String {
    format!("{}\n{}", id_badge("favorites", favorites), id_badge("cart", cart))
}

fn id_badge(label: &str, ids: &BTreeSet<ProductId>) -> String {
    if ids.is_empty() {
        return format!("{label} (0): none");
    }
    let listed: Vec<&str> = ids.iter().map(ProductId::as_str).collect();
    format!("{label} ({}): {}", ids.len(), listed.join(", "))
}
