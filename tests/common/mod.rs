//! Shared fixtures for the integration tests

pub mod fakes;
pub mod strategies;

#[allow(unused_imports)]
pub use fakes::*;

use recognizer_bridge::config::BridgeConfig;

/// Configuration pointing every upstream at the given base URL
#[allow(dead_code)]
pub fn test_config(page_size: usize) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.sync.page_size = page_size;
    config.sync.annotator_id = "$test_recognizer".to_string();
    config.file_server_url = "https://files.test".to_string();
    config.database.shared_secret = "s3cret".to_string();
    config
}
