//! Broker address list loaded from a `key=value` file.
//!
//! The file holds a single meaningful line, for example:
//!
//! ```text
//! brokers=kafka-1:9092,kafka-2:9092,kafka-3:9092
//! ```
//!
//! Blank lines and `#` comments before it are skipped. The key is not
//! interpreted; only the comma-separated value matters.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult};

/// Ordered, immutable list of `host:port` bootstrap addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerList(Vec<String>);

impl BrokerList {
    /// Read and parse the broker list from `path`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file is missing or unreadable, or if
    /// its contents fail [`BrokerList::parse`].
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "cannot read broker config '{}': {e}",
                path.display()
            ))
        })?;

        let list = Self::parse(&contents)?;
        debug!(path = %path.display(), brokers = %list, "Loaded broker list");
        Ok(list)
    }

    /// Parse broker list text.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if there is no `key=value` line, an address
    /// is not `host:port`, or the list is empty.
    pub fn parse(contents: &str) -> AppResult<Self> {
        let line = contents
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'))
            .ok_or_else(|| AppError::Config("broker config is empty".to_string()))?;

        let (_key, value) = line.split_once('=').ok_or_else(|| {
            AppError::Config(format!(
                "broker config line must be 'key=host:port,...', got '{line}'"
            ))
        })?;

        let addresses = value
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(|a| validate_address(a).map(|()| a.to_string()))
            .collect::<AppResult<Vec<_>>>()?;

        if addresses.is_empty() {
            return Err(AppError::Config(
                "broker config lists no broker addresses".to_string(),
            ));
        }

        Ok(Self(addresses))
    }

    /// Comma-joined form expected by `bootstrap.servers`.
    pub fn bootstrap_servers(&self) -> String {
        self.0.join(",")
    }

    pub fn addresses(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BrokerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

fn validate_address(address: &str) -> AppResult<()> {
    let malformed = || AppError::Config(format!("broker address '{address}' is not host:port"));

    let (host, port) = address.rsplit_once(':').ok_or_else(malformed)?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return Err(malformed());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line() {
        let list = BrokerList::parse("brokers=kafka-1:9092,kafka-2:9092\n").unwrap();

        assert_eq!(list.addresses(), ["kafka-1:9092", "kafka-2:9092"]);
        assert_eq!(list.bootstrap_servers(), "kafka-1:9092,kafka-2:9092");
    }

    #[test]
    fn test_parse_keeps_order_and_trims() {
        let list = BrokerList::parse("brokers= c:1 , a:2,b:3 \r\n").unwrap();

        assert_eq!(list.addresses(), ["c:1", "a:2", "b:3"]);
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let list = BrokerList::parse("# cluster\n\nbrokers=localhost:9092\nignored=x:1\n").unwrap();

        assert_eq!(list.addresses(), ["localhost:9092"]);
        assert_eq!(list.len(), 1);
        assert!(!list.is_empty());
    }

    #[test]
    fn test_parse_drops_empty_entries() {
        let list = BrokerList::parse("brokers=a:1,,b:2,").unwrap();

        assert_eq!(list.addresses(), ["a:1", "b:2"]);
    }

    #[test]
    fn test_parse_wrong_delimiter() {
        let err = BrokerList::parse("brokers: a:1,b:2").unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("key=host:port"));
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(matches!(
            BrokerList::parse("brokers="),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            BrokerList::parse("brokers= , ,"),
            Err(AppError::Config(_))
        ));
        assert!(matches!(BrokerList::parse(""), Err(AppError::Config(_))));
        assert!(matches!(
            BrokerList::parse("# only a comment\n"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_parse_malformed_address() {
        assert!(BrokerList::parse("brokers=localhost").is_err());
        assert!(BrokerList::parse("brokers=:9092").is_err());
        assert!(BrokerList::parse("brokers=host:notaport").is_err());
        assert!(BrokerList::parse("brokers=host:70000").is_err());
    }

    #[test]
    fn test_parse_ipv6_address() {
        let list = BrokerList::parse("brokers=[::1]:9092").unwrap();

        assert_eq!(list.addresses(), ["[::1]:9092"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = BrokerList::load("/nonexistent/kafka-http-gateway/config").unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("cannot read broker config"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "kafka-http-gateway-brokers-{}",
            std::process::id()
        ));
        fs::write(&path, "brokers=localhost:9092,localhost:9093\n").unwrap();

        let list = BrokerList::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(list.addresses(), ["localhost:9092", "localhost:9093"]);
    }

    #[test]
    fn test_display() {
        let list = BrokerList::parse("brokers=a:1,b:2").unwrap();

        assert_eq!(list.to_string(), "a:1, b:2");
    }
}
