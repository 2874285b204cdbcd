use super::domain::split_domain;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// The file a snapshot was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSource {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// One immutable generation of the four filter sets.
///
/// A snapshot is built completely before it is published, so every lookup
/// against it sees sets that came from the same parse of the same file.
#[derive(Debug, Default)]
pub struct FilterLists {
    ips: FxHashSet<IpAddr>,
    domains: FxHashSet<Box<str>>,
    asns: FxHashSet<u32>,
    countries: FxHashSet<Box<str>>,
    source: Option<ListSource>,
    invalid_lines: usize,
}

impl FilterLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_ip(&mut self, ip: IpAddr) {
        self.ips.insert(ip.to_canonical());
    }

    pub fn insert_domain(&mut self, domain: impl Into<Box<str>>) {
        self.domains.insert(domain.into());
    }

    pub fn insert_asn(&mut self, number: u32) {
        self.asns.insert(number);
    }

    pub fn insert_country(&mut self, code: impl Into<Box<str>>) {
        self.countries.insert(code.into());
    }

    pub(crate) fn record_invalid_line(&mut self) {
        self.invalid_lines += 1;
    }

    pub fn with_source(mut self, source: ListSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn source(&self) -> Option<&ListSource> {
        self.source.as_ref()
    }

    pub fn invalid_lines(&self) -> usize {
        self.invalid_lines
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
            && self.domains.is_empty()
            && self.asns.is_empty()
            && self.countries.is_empty()
    }

    pub fn contains_ip(&self, ip: IpAddr) -> bool {
        self.ips.contains(&ip.to_canonical())
    }

    /// Returns the listed entry that matched `domain`, if any.
    ///
    /// Without `match_subdomains` only the exact name is tested. With it, the
    /// name and each parent down to the registrable domain are tested, most
    /// specific first.
    pub fn match_domain(&self, domain: &str, match_subdomains: bool) -> Option<String> {
        if !match_subdomains {
            return self
                .domains
                .contains(domain)
                .then(|| domain.to_string());
        }

        split_domain(domain)
            .into_iter()
            .find(|candidate| self.domains.contains(candidate.as_str()))
    }

    pub fn contains_asn(&self, number: u32) -> bool {
        self.asns.contains(&number)
    }

    pub fn contains_country(&self, code: &str) -> bool {
        self.countries.contains(code)
    }

    pub fn summary(&self) -> ListSummary {
        ListSummary {
            file_path: self
                .source
                .as_ref()
                .map(|s| s.path.display().to_string()),
            modified_unix_secs: self.source.as_ref().and_then(|s| {
                s.modified
                    .duration_since(UNIX_EPOCH)
                    .ok()
                    .map(|d| d.as_secs())
            }),
            ips: self.ips.len(),
            domains: self.domains.len(),
            asns: self.asns.len(),
            countries: self.countries.len(),
            invalid_lines: self.invalid_lines,
        }
    }
}

/// Entry counts and origin of a snapshot, for logs and the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub file_path: Option<String>,
    pub modified_unix_secs: Option<u64>,
    pub ips: usize,
    pub domains: usize,
    pub asns: usize,
    pub countries: usize,
    pub invalid_lines: usize,
}

impl ListSummary {
    pub fn total(&self) -> usize {
        self.ips + self.domains + self.asns + self.countries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_mapped_addresses_match_plain_ipv4() {
        let mut lists = FilterLists::new();
        lists.insert_ip("::ffff:192.0.2.1".parse().unwrap());

        assert!(lists.contains_ip("192.0.2.1".parse().unwrap()));
        assert!(lists.contains_ip("::ffff:192.0.2.1".parse().unwrap()));
        assert!(!lists.contains_ip("192.0.2.2".parse().unwrap()));
    }

    #[test]
    fn test_exact_domain_match_returns_input() {
        let mut lists = FilterLists::new();
        lists.insert_domain("evil.example.");

        assert_eq!(
            lists.match_domain("evil.example.", false),
            Some("evil.example.".to_string())
        );
        assert_eq!(lists.match_domain("sub.evil.example.", false), None);
    }

    #[test]
    fn test_summary_counts_each_bucket() {
        let mut lists = FilterLists::new();
        lists.insert_country("US");
        lists.insert_asn(1234);
        lists.insert_asn(1234);
        lists.insert_ip("203.0.113.5".parse().unwrap());
        lists.insert_domain("evil.example.");
        lists.record_invalid_line();

        let summary = lists.summary();
        assert_eq!(summary.countries, 1);
        assert_eq!(summary.asns, 1);
        assert_eq!(summary.ips, 1);
        assert_eq!(summary.domains, 1);
        assert_eq!(summary.invalid_lines, 1);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.file_path, None);
    }
}
