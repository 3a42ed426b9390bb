// Per-network deployment parameters and network selection
use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentLevel;
use std::str::FromStr;
use thiserror::Error;

/// Networks where the coordinator mock is deployed instead of a live coordinator
pub const DEVELOPMENT_CHAINS: &[&str] = &["localnet", "localhost"];

pub const NETWORK_ENV: &str = "RAFFLE_NETWORK";
pub const VRF_COORDINATOR_ENV: &str = "RAFFLE_VRF_COORDINATOR";
pub const SUBSCRIPTION_ID_ENV: &str = "RAFFLE_SUBSCRIPTION_ID";
pub const DEFAULT_NETWORK: &str = "localnet";

/// 500 gwei key hash, shared by the local and test lanes
const TEST_GAS_LANE: [u8; 32] = [
    216, 155, 43, 241, 80, 227, 185, 225, 52, 70, 152, 110, 87, 31, 185, 202, 178, 75, 19, 206,
    160, 164, 62, 162, 10, 96, 73, 168, 92, 200, 7, 204,
];
const MAINNET_GAS_LANE: [u8; 32] = [
    138, 243, 152, 153, 91, 4, 194, 142, 153, 81, 173, 185, 114, 30, 247, 76, 116, 249, 62, 106,
    71, 143, 57, 231, 224, 119, 123, 225, 53, 39, 231, 239,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown network `{0}`")]
    UnknownNetwork(String),

    #[error("network `{network}` has no `{setting}` configured")]
    MissingSetting { network: String, setting: &'static str },

    #[error("invalid value `{value}` for `{setting}`")]
    InvalidSetting { setting: &'static str, value: String },
}

/// Deployment parameters of one network
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfig {
    pub name: String,
    /// Live coordinator program; `None` on development chains
    pub vrf_coordinator: Option<Pubkey>,
    /// Live subscription; `None` on development chains
    pub subscription_id: Option<u64>,
    /// Lamports per entry
    pub entrance_fee: u64,
    pub gas_lane: [u8; 32],
    pub callback_gas_limit: u32,
    /// Seconds between draws
    pub interval: i64,
    /// Commitment a deployment waits for
    pub commitment: CommitmentLevel,
}

pub fn is_development_chain(name: &str) -> bool {
    DEVELOPMENT_CHAINS.contains(&name)
}

impl NetworkConfig {
    /// Built-in parameters of a named network
    pub fn for_network(name: &str) -> Result<Self, ConfigError> {
        let config = match name {
            "localnet" | "localhost" => Self {
                name: name.to_string(),
                vrf_coordinator: None,
                subscription_id: None,
                entrance_fee: 10_000_000, // 0.01 SOL
                gas_lane: TEST_GAS_LANE,
                callback_gas_limit: 500_000,
                interval: 30,
                commitment: CommitmentLevel::Confirmed,
            },
            "devnet" => Self {
                name: name.to_string(),
                vrf_coordinator: None,
                subscription_id: None,
                entrance_fee: 10_000_000, // 0.01 SOL
                gas_lane: TEST_GAS_LANE,
                callback_gas_limit: 500_000,
                interval: 30,
                commitment: CommitmentLevel::Finalized,
            },
            "mainnet-beta" => Self {
                name: name.to_string(),
                vrf_coordinator: None,
                subscription_id: None,
                entrance_fee: 100_000_000, // 0.1 SOL
                gas_lane: MAINNET_GAS_LANE,
                callback_gas_limit: 500_000,
                interval: 86_400,
                commitment: CommitmentLevel::Finalized,
            },
            other => return Err(ConfigError::UnknownNetwork(other.to_string())),
        };
        Ok(config)
    }

    /// Select the network and its overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Select the network and its overrides through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = lookup(NETWORK_ENV).unwrap_or_else(|| DEFAULT_NETWORK.to_string());
        let mut config = Self::for_network(&name)?;

        // live coordinator settings only apply off the development chains
        if config.is_development() {
            return Ok(config);
        }

        if let Some(value) = lookup(VRF_COORDINATOR_ENV) {
            let coordinator = Pubkey::from_str(&value).map_err(|_| ConfigError::InvalidSetting {
                setting: VRF_COORDINATOR_ENV,
                value: value.clone(),
            })?;
            config.vrf_coordinator = Some(coordinator);
        }
        if let Some(value) = lookup(SUBSCRIPTION_ID_ENV) {
            let subscription_id = value.parse::<u64>().map_err(|_| ConfigError::InvalidSetting {
                setting: SUBSCRIPTION_ID_ENV,
                value: value.clone(),
            })?;
            config.subscription_id = Some(subscription_id);
        }
        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        is_development_chain(&self.name)
    }

    /// Coordinator and subscription of a live network
    pub fn live_coordinator(&self) -> Result<(Pubkey, u64), ConfigError> {
        let coordinator = self.vrf_coordinator.ok_or_else(|| ConfigError::MissingSetting {
            network: self.name.clone(),
            setting: "vrf_coordinator",
        })?;
        let subscription_id = self.subscription_id.ok_or_else(|| ConfigError::MissingSetting {
            network: self.name.clone(),
            setting: "subscription_id",
        })?;
        Ok((coordinator, subscription_id))
    }
}
