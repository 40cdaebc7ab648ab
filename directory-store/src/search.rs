use shared_types::{Company, CompanyCategory};

/// Number of suggestions the search dropdown shows.
pub const DROPDOWN_LIMIT: usize = 8;

/// Client-side search over the loaded list.
///
/// A blank query yields nothing. Name matches come first, followed by
/// description and category matches, each group in list order.
pub fn filter(companies: &[Company], query: &str, limit: usize) -> Vec<Company> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut by_name = Vec::new();
    let mut by_other = Vec::new();
    for company in companies {
        if company.name.to_lowercase().contains(&needle) {
            by_name.push(company);
        } else if company.description.to_lowercase().contains(&needle)
            || company.category.label().to_lowercase().contains(&needle)
        {
            by_other.push(company);
        }
    }

    by_name
        .into_iter()
        .chain(by_other)
        .take(limit)
        .cloned()
        .collect()
}

pub fn highlighted(companies: &[Company]) -> Vec<Company> {
    companies
        .iter()
        .filter(|company| company.is_highlighted())
        .cloned()
        .collect()
}

pub fn in_category(companies: &[Company], category: CompanyCategory) -> Vec<Company> {
    companies
        .iter()
        .filter(|company| company.category == category)
        .cloned()
        .collect()
}

/// Count per category, every category included, in navigation order.
pub fn category_counts(companies: &[Company]) -> Vec<(CompanyCategory, usize)> {
    CompanyCategory::all()
        .iter()
        .map(|category| {
            let count = companies
                .iter()
                .filter(|company| company.category == *category)
                .count();
            (*category, count)
        })
        .collect()
}
