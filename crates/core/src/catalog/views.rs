//! Derived projections of the catalog joined with selection state.
//!
//! Nothing here is stored; callers recompute on every render.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::product::Product;
use crate::selection::SelectionSnapshot;

pub fn cart_contents<'a, I>(catalog: I, cart: &SelectionSnapshot) -> Vec<Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    selected(catalog, cart)
}

pub fn favorites<'a, I>(catalog: I, favorites: &SelectionSnapshot) -> Vec<Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    selected(catalog, favorites)
}

pub fn deals<'a, I>(catalog: I) -> Vec<Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    catalog.into_iter().filter(|product| product.is_on_sale()).cloned().collect()
}

fn selected<'a, I>(catalog: I, selection: &SelectionSnapshot) -> Vec<Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    catalog.into_iter().filter(|product| selection.is_selected(&product.id)).cloned().collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub unit_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl CartSummary {
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Order summary for the cart page. Lines are charged at list price; sale
/// badges are a catalog display concern. Shipping is always free.
pub fn cart_summary<'a, I>(catalog: I, cart: &SelectionSnapshot) -> CartSummary
where
    I: IntoIterator<Item = &'a Product>,
{
    let lines: Vec<CartLine> = cart_contents(catalog, cart)
        .into_iter()
        .map(|product| CartLine { unit_price: product.price, product })
        .collect();
    let subtotal: Decimal = lines.iter().map(|line| line.unit_price).sum();
    let shipping = Decimal::ZERO;

    CartSummary { lines, subtotal, shipping, total: subtotal + shipping }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{cart_contents, cart_summary, deals, favorites};
    use crate::catalog::fixtures::catalog;
    use crate::domain::product::ProductId;
    use crate::selection::SelectionStore;

    fn ids(products: &[crate::domain::product::Product]) -> Vec<&str> {
        products.iter().map(|product| product.id.as_str()).collect()
    }

    #[test]
    fn favorites_lists_exactly_favorited_products_in_catalog_order() {
        let catalog = catalog();
        let store = SelectionStore::favorites();
        store.toggle(&ProductId("abc".to_owned()));
        store.toggle(&ProductId("sofa".to_owned()));
        store.toggle(&ProductId("lamp".to_owned()));
        store.toggle(&ProductId("lamp".to_owned()));

        let listed = favorites(catalog.iter(), &store.snapshot());

        assert_eq!(ids(&listed), vec!["sofa", "abc"]);
    }

    #[test]
    fn selections_for_unknown_products_are_ignored() {
        let catalog = catalog();
        let cart = SelectionStore::cart();
        cart.toggle(&ProductId("discontinued".to_owned()));

        assert!(cart_contents(catalog.iter(), &cart.snapshot()).is_empty());
    }

    #[test]
    fn deals_only_include_positive_sales() {
        let catalog = catalog();
        let listed = deals(catalog.iter());

        assert_eq!(ids(&listed), vec!["chair", "table"]);
        assert!(listed.iter().all(|product| product.sale_pct.is_some()));
    }

    #[test]
    fn cart_summary_prices_lines_at_list_price() {
        let catalog = catalog();
        let cart = SelectionStore::cart();
        cart.toggle(&ProductId("chair".to_owned()));
        cart.toggle(&ProductId("sofa".to_owned()));

        let summary = cart_summary(catalog.iter(), &cart.snapshot());

        assert_eq!(summary.item_count(), 2);
        assert_eq!(summary.lines[0].product.id.as_str(), "sofa");
        assert_eq!(summary.lines[1].product.id.as_str(), "chair");
        assert_eq!(summary.lines[1].unit_price, Decimal::new(10_000, 2));
        assert_eq!(summary.subtotal, Decimal::new(99_900, 2));
        assert_eq!(summary.shipping, Decimal::ZERO);
        assert_eq!(summary.total, summary.subtotal);
    }

    #[test]
    fn sale_does_not_reduce_cart_subtotal() {
        let catalog = catalog();
        let cart = SelectionStore::cart();
        cart.toggle(&ProductId("chair".to_owned()));

        let summary = cart_summary(catalog.iter(), &cart.snapshot());

        assert_eq!(summary.subtotal, Decimal::new(10_000, 2));
        assert_eq!(summary.total, Decimal::new(10_000, 2));
    }

    #[test]
    fn empty_cart_has_zero_total() {
        let catalog = catalog();
        let summary = cart_summary(catalog.iter(), &SelectionStore::cart().snapshot());

        assert!(summary.is_empty());
        assert_eq!(summary.total, Decimal::ZERO);
    }
}
