/// Normalize a raw catalog author string for comparison.
///
/// - `"Surname, Given"` becomes `"Given Surname"` (split on the first comma)
/// - `"J.Smith"` (period, no space) becomes the part after the last period
/// - anything else passes through unchanged
///
/// The first applicable rule wins; rules never chain.
pub fn normalize_author(raw: &str) -> String {
    if let Some((surname, given)) = raw.split_once(',') {
        let surname = surname.trim();
        let given = given.trim();
        return match (given.is_empty(), surname.is_empty()) {
            (true, _) => surname.to_string(),
            (_, true) => given.to_string(),
            _ => format!("{} {}", given, surname),
        };
    }

    if !raw.contains(' ') {
        if let Some((_, tail)) = raw.rsplit_once('.') {
            return tail.trim().to_string();
        }
    }

    raw.to_string()
}

/// Normalize every author of a record, preserving order
pub fn normalize_authors(authors: &[String]) -> Vec<String> {
    authors.iter().map(|a| normalize_author(a)).collect()
}
