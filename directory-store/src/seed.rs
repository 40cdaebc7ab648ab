use shared_types::Company;

const SEED_COMPANIES: &str = include_str!("../data/seed_companies.json");

/// Companies bundled with the binary. Used to bootstrap an empty table and as
/// the offline dataset.
pub fn initial_companies() -> Result<Vec<Company>, serde_json::Error> {
    serde_json::from_str(SEED_COMPANIES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_parses_with_unique_ids() {
        let companies = initial_companies().unwrap();
        assert_eq!(companies.len(), 10);

        let ids: HashSet<_> = companies.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), companies.len());
    }

    #[test]
    fn test_seed_has_featured_companies() {
        let companies = initial_companies().unwrap();
        let featured = companies.iter().filter(|c| c.is_highlighted()).count();
        assert_eq!(featured, 3);
        assert!(companies.iter().all(|c| !c.features().is_empty()));
    }
}
