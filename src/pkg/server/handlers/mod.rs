pub mod applications;
pub mod auth;
pub mod companies;
pub mod contact;
pub mod jobs;
pub mod probes;
pub mod profile;

/// Split a comma-separated query parameter into trimmed, non-empty values.
pub(crate) fn csv_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_list() {
        assert!(csv_list(None).is_empty());
        assert!(csv_list(Some("")).is_empty());
        assert_eq!(csv_list(Some("rust")), vec!["rust"]);
        assert_eq!(
            csv_list(Some("rust, go ,,typescript")),
            vec!["rust", "go", "typescript"]
        );
    }
}
