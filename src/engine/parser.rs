use super::lists::FilterLists;
use super::traits::ListParser;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read filter list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a single list entry was classified as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Country(String),
    Asn(u32),
    Ip(IpAddr),
    Domain(String),
}

/// Reads list files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileParser;

impl FileParser {
    pub fn new() -> Self {
        Self
    }

    /// Classifies one line. Returns `None` for blank lines and comments,
    /// `Some(None)` for lines that hold no valid entry.
    pub fn parse_line(line: &str) -> Option<Option<Entry>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        // Anything after the first field is a comment.
        let field = line.split_whitespace().next()?;
        Some(classify(field))
    }

    pub fn parse_content(text: &str) -> FilterLists {
        let mut lists = FilterLists::new();
        for (idx, line) in text.lines().enumerate() {
            match Self::parse_line(line) {
                None => {}
                Some(Some(Entry::Country(code))) => lists.insert_country(code),
                Some(Some(Entry::Asn(number))) => lists.insert_asn(number),
                Some(Some(Entry::Ip(ip))) => lists.insert_ip(ip),
                Some(Some(Entry::Domain(domain))) => lists.insert_domain(domain),
                Some(None) => {
                    warn!(
                        "Ignoring invalid filter list entry on line {}: {:?}",
                        idx + 1,
                        line.trim()
                    );
                    lists.record_invalid_line();
                }
            }
        }
        lists
    }
}

#[async_trait::async_trait]
impl ListParser for FileParser {
    async fn parse(&self, path: &Path) -> Result<FilterLists, ParseError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ParseError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let lists = Self::parse_content(&text);
        let summary = lists.summary();
        info!(
            "Parsed filter list {}: {} IPs, {} domains, {} ASNs, {} countries ({} invalid lines)",
            path.display(),
            summary.ips,
            summary.domains,
            summary.asns,
            summary.countries,
            summary.invalid_lines
        );
        Ok(lists)
    }
}

fn classify(field: &str) -> Option<Entry> {
    if is_country_code(field) {
        return Some(Entry::Country(field.to_string()));
    }

    if let Some(digits) = field.strip_prefix("AS") {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            // Digits that overflow a u32 are not an AS number.
            return digits.parse().ok().map(Entry::Asn);
        }
    }

    if let Ok(ip) = field.parse::<IpAddr>() {
        return Some(Entry::Ip(ip.to_canonical()));
    }

    let fqdn = if field.ends_with('.') {
        field.to_lowercase()
    } else {
        format!("{}.", field.to_lowercase())
    };
    is_valid_fqdn(&fqdn).then_some(Entry::Domain(fqdn))
}

fn is_country_code(field: &str) -> bool {
    field.len() == 2 && field.bytes().all(|b| b.is_ascii_uppercase())
}

/// Checks a dot-terminated name against DNS length and label rules.
/// Underscores are allowed since they show up in service names.
fn is_valid_fqdn(fqdn: &str) -> bool {
    if fqdn.len() < 2 || fqdn.len() > 254 {
        return false;
    }

    fqdn[..fqdn.len() - 1].split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    })
}
