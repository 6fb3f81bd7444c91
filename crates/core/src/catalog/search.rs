use crate::domain::product::Product;

/// Case-insensitive substring filter over product names.
///
/// Blank queries match nothing; the search results panel stays hidden
/// instead of listing the whole catalog. Any other query is matched as
/// typed, padding included. Results keep catalog order.
pub fn search<'a, I>(query: &str, catalog: I) -> Vec<Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    catalog.into_iter().filter(|product| matches(&needle, product)).cloned().collect()
}

fn matches(needle: &str, product: &Product) -> bool {
    product.name.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::search;
    use crate::catalog::fixtures::catalog;

    fn names(query: &str) -> Vec<String> {
        search(query, catalog().iter()).into_iter().map(|product| product.name).collect()
    }

    #[test]
    fn blank_queries_return_nothing() {
        for query in ["", " ", "\t\n", "   "] {
            assert!(names(query).is_empty(), "query {query:?} should match nothing");
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(names("OAK"), vec!["Oak Dining Chair", "Oak Coffee Table"]);
        assert_eq!(names("brass"), vec!["Brass Floor Lamp"]);
    }

    #[test]
    fn matching_uses_substrings_not_tokens() {
        assert_eq!(names("chai"), vec!["Oak Dining Chair", "Velvet Armchair"]);
    }

    #[test]
    fn padding_is_part_of_the_query() {
        assert!(names(" oak").is_empty(), "no name contains a space before `oak`");
        assert_eq!(names("oak "), vec!["Oak Dining Chair", "Oak Coffee Table"]);
    }

    #[test]
    fn results_are_sound_and_complete() {
        let catalog = catalog();
        for query in ["o", "oak", " oak", "chair ", "ir", "z", "Lamp", "a", "n s"] {
            let results = search(query, catalog.iter());
            let needle = query.to_lowercase();

            assert!(results.iter().all(|product| product.name.to_lowercase().contains(&needle)));
            let excluded = catalog.iter().filter(|product| !results.contains(product));
            assert!(excluded
                .into_iter()
                .all(|product| !product.name.to_lowercase().contains(&needle)));
        }
    }

    #[test]
    fn results_keep_catalog_order() {
        let catalog = catalog();
        let results = search("a", catalog.iter());
        let positions: Vec<_> = results
            .iter()
            .filter_map(|hit| catalog.iter().position(|product| product.id == hit.id))
            .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
