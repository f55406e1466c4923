use serde::{Deserialize, Serialize};
use ss_chain_client::ContractConfig;
use std::time::Duration;

use crate::DappError;

pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 1500;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Host-supplied settings. Every field falls back to its default when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DappConfig {
    pub contract: ContractConfig,
    pub receipt_poll_interval_ms: u64,
    /// Whether the host should reload the page after a chain change resets the session.
    pub reload_on_chain_change: bool,
    pub log_filter: String,
}

impl Default for DappConfig {
    fn default() -> Self {
        Self {
            contract: ContractConfig::default(),
            receipt_poll_interval_ms: DEFAULT_RECEIPT_POLL_INTERVAL_MS,
            reload_on_chain_change: true,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl DappConfig {
    pub fn from_json(raw: &str) -> Result<Self, DappError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| DappError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DappError> {
        if !is_hex_address(&self.contract.address) {
            return Err(DappError::Config(format!(
                "contract address '{}' is not a 20-byte hex address",
                self.contract.address
            )));
        }
        if self.contract.gas_limit == 0 {
            return Err(DappError::Config("gas limit must be greater than 0".to_owned()));
        }
        if self.receipt_poll_interval_ms == 0 {
            return Err(DappError::Config(
                "receipt poll interval must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}

fn is_hex_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(digits) => digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
