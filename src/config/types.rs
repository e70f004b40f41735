use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Main configuration structure for Catalog Enricher
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub scrape: ScrapeConfig,

    #[serde(default)]
    pub pacing: PacingConfig,

    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Replaces the built-in browser header profile when present
    #[serde(default)]
    pub headers: Option<HeaderTable>,
}

/// Header name/value pairs kept in the order they appear in the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTable(Vec<(String, String)>);

impl HeaderTable {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

impl FromIterator<(String, String)> for HeaderTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for HeaderTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeaderTableVisitor;

        impl<'de> Visitor<'de> for HeaderTableVisitor {
            type Value = HeaderTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of header names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(pair) = map.next_entry::<String, String>()? {
                    pairs.push(pair);
                }
                Ok(HeaderTable(pairs))
            }
        }

        deserializer.deserialize_map(HeaderTableVisitor)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Scrape request defaults
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// Number of products enriched when a request omits `limit`
    #[serde(rename = "default-limit", default = "default_limit")]
    pub default_limit: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

/// Randomized delays applied around each detail fetch
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Lower bound of the delay before a detail fetch (milliseconds)
    #[serde(rename = "detail-delay-min-ms", default = "default_detail_delay_min")]
    pub detail_delay_min_ms: u64,

    /// Upper bound of the delay before a detail fetch (milliseconds)
    #[serde(rename = "detail-delay-max-ms", default = "default_detail_delay_max")]
    pub detail_delay_max_ms: u64,

    /// Lower bound of the gap between two products (milliseconds)
    #[serde(rename = "item-gap-min-ms", default = "default_item_gap_min")]
    pub item_gap_min_ms: u64,

    /// Upper bound of the gap between two products (milliseconds)
    #[serde(rename = "item-gap-max-ms", default = "default_item_gap_max")]
    pub item_gap_max_ms: u64,

    /// Pause between two drained log lines (milliseconds)
    #[serde(rename = "log-pause-ms", default = "default_log_pause")]
    pub log_pause_ms: u64,
}

impl PacingConfig {
    /// Pacing with every delay set to zero, for tests and local runs
    pub fn immediate() -> Self {
        Self {
            detail_delay_min_ms: 0,
            detail_delay_max_ms: 0,
            item_gap_min_ms: 0,
            item_gap_max_ms: 0,
            log_pause_ms: 0,
        }
    }

    /// Draws a delay for the wait before a detail fetch
    pub fn detail_delay(&self) -> Duration {
        jitter(self.detail_delay_min_ms..=self.detail_delay_max_ms)
    }

    /// Draws a delay for the gap between two products
    pub fn item_gap(&self) -> Duration {
        jitter(self.item_gap_min_ms..=self.item_gap_max_ms)
    }

    pub fn log_pause(&self) -> Duration {
        Duration::from_millis(self.log_pause_ms)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            detail_delay_min_ms: default_detail_delay_min(),
            detail_delay_max_ms: default_detail_delay_max(),
            item_gap_min_ms: default_item_gap_min(),
            item_gap_max_ms: default_item_gap_max(),
            log_pause_ms: default_log_pause(),
        }
    }
}

/// Uniform draw within the window; an inverted window collapses to its lower bound
fn jitter(window: RangeInclusive<u64>) -> Duration {
    let (min, max) = (*window.start(), *window.end());
    if max <= min {
        return Duration::from_millis(min);
    }
    Duration::from_millis(fastrand::u64(min..=max))
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_limit() -> usize {
    5
}

fn default_detail_delay_min() -> u64 {
    500
}

fn default_detail_delay_max() -> u64 {
    1500
}

fn default_item_gap_min() -> u64 {
    200
}

fn default_item_gap_max() -> u64 {
    700
}

fn default_log_pause() -> u64 {
    1
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}
