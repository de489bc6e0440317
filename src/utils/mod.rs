//! Project-specific utilities live here.

/// Public URL of a single resource, used for `Location` headers.
pub fn resource_location(module: &str, id: i64) -> String {
    format!("/api/{module}/{id}")
}

/// Comparison key for names that must be unique: surrounding whitespace
/// stripped, case folded.
pub fn name_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Drop repeated ids, keeping the first occurrence of each.
pub fn distinct_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_points_at_module_resource() {
        assert_eq!(resource_location("books", 7), "/api/books/7");
    }

    #[test]
    fn name_key_ignores_any_surrounding_whitespace() {
        assert_eq!(name_key("\tKenya\n"), name_key("  kenya "));
        assert_eq!(name_key("Côte d'Ivoire"), name_key("CÔTE D'IVOIRE"));
        assert_ne!(name_key("Ken ya"), name_key("Kenya"));
    }

    #[test]
    fn distinct_ids_keeps_first_occurrence_order() {
        assert_eq!(distinct_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(distinct_ids(&[]).is_empty());
    }
}
