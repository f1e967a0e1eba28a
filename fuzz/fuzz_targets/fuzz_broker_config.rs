//! Fuzz the broker list file parser.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_broker_config
//! ```

#![no_main]

use kafka_http_gateway::BrokerList;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(contents) = std::str::from_utf8(data) {
        if let Ok(brokers) = BrokerList::parse(contents) {
            assert!(!brokers.is_empty());
            assert!(!brokers.bootstrap_servers().is_empty());
        }
    }
});
