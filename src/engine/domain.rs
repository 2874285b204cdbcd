/// Splits `domain` into the names to test for a subdomain-aware match.
///
/// Candidates run from the full name down to the registrable domain (one
/// label above the public suffix), each with a single trailing dot. A bare
/// public suffix is returned as-is, as the only candidate.
pub fn split_domain(domain: &str) -> Vec<String> {
    let domain = domain.trim_matches('.');
    // Unlisted TLDs and single labels are their own suffix.
    let suffix = psl::suffix_str(domain).unwrap_or(domain);
    if suffix == domain {
        return vec![domain.to_string()];
    }

    let without_suffix = domain[..domain.len() - suffix.len()].trim_matches('.');
    let labels: Vec<&str> = without_suffix
        .split('.')
        .filter(|label| !label.is_empty())
        .collect();

    (0..labels.len())
        .map(|idx| {
            let mut candidate = labels[idx..].join(".");
            candidate.push('.');
            candidate.push_str(suffix);
            if !candidate.ends_with('.') {
                candidate.push('.');
            }
            candidate
        })
        .collect()
}
