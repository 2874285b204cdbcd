use super::lists::FilterLists;
use arc_swap::ArcSwap;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::info;

/// Shared, hot-swappable holder of the current filter lists.
///
/// Lookups load the current snapshot without blocking. `reload` publishes a
/// fully built snapshot with a single pointer swap, so readers see either the
/// old or the new generation in full.
#[derive(Debug)]
pub struct FilterStore {
    lists: ArcSwap<FilterLists>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self {
            lists: ArcSwap::from_pointee(FilterLists::new()),
        }
    }

    pub fn snapshot(&self) -> Arc<FilterLists> {
        self.lists.load_full()
    }

    pub fn reload(&self, lists: FilterLists) {
        let summary = lists.summary();
        self.lists.store(Arc::new(lists));
        info!(
            "Custom filter list active: {} entries from {}",
            summary.total(),
            summary.file_path.as_deref().unwrap_or("<none>")
        );
    }

    pub fn clear(&self) {
        self.lists.store(Arc::new(FilterLists::new()));
        info!("Custom filter list cleared");
    }

    pub fn lookup_ip(&self, ip: IpAddr) -> bool {
        self.lists.load().contains_ip(ip)
    }

    /// Returns the listed domain that matched, see [`FilterLists::match_domain`].
    pub fn lookup_domain(&self, domain: &str, match_subdomains: bool) -> Option<String> {
        self.lists.load().match_domain(domain, match_subdomains)
    }

    pub fn lookup_asn(&self, number: u32) -> bool {
        self.lists.load().contains_asn(number)
    }

    pub fn lookup_country(&self, code: &str) -> bool {
        self.lists.load().contains_country(code)
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}
