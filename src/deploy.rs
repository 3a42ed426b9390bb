// Deployment scripts: coordinator mock, raffle, and post-deploy verification
use log::info;
use solana_program::{instruction::Instruction, program_error::ProgramError, pubkey::Pubkey};
use solana_sdk::commitment_config::CommitmentLevel;
use std::str::FromStr;
use thiserror::Error;

use crate::network_config::{ConfigError, NetworkConfig};
use crate::raffle_instruction;
use crate::raffle_state::Raffle;
use crate::utils::find_raffle_address;
use crate::vrf_mock_instruction;

/// Premium per fulfillment: 0.25 LINK (9 decimals)
pub const BASE_FEE: u64 = 250_000_000;
/// LINK per unit of callback gas
pub const GAS_PRICE_LINK: u64 = 1;
/// 30 LINK funded into a fresh mock subscription
pub const VRF_SUB_FUND_AMOUNT: u64 = 30_000_000_000;

pub const VERIFY_ENV: &str = "RAFFLE_VERIFY";

const SEPARATOR: &str = "---------------------------------------------------------------------------";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("network `{0}` needs a VRF coordinator mock program id")]
    MissingMockProgram(String),

    #[error("unknown deploy tag `{0}`")]
    UnknownTag(String),

    #[error("cannot build raffle instruction: {0}")]
    InstructionBuild(ProgramError),

    #[error("deployed raffle account is unreadable: {0}")]
    InvalidRaffleAccount(ProgramError),

    #[error("deployed {field} is {actual}, expected {expected}")]
    VerificationMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
}

/// Tags selecting deploy steps, as in `fixture(["all"])`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployTag {
    All,
    Mocks,
    Raffle,
}

impl FromStr for DeployTag {
    type Err = DeployError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "all" => Ok(Self::All),
            "mocks" => Ok(Self::Mocks),
            "raffle" => Ok(Self::Raffle),
            other => Err(DeployError::UnknownTag(other.to_string())),
        }
    }
}

/// Who deploys what, where
#[derive(Clone, Debug)]
pub struct DeployContext {
    pub network: NetworkConfig,
    pub deployer: Pubkey,
    pub raffle_program_id: Pubkey,
    /// Program id of the coordinator mock on development chains
    pub vrf_mock_program_id: Option<Pubkey>,
    /// Subscriptions the mock already holds; the raffle gets the next id
    pub existing_subscriptions: u64,
    /// Verify the deployed raffle on live networks
    pub verify: bool,
}

impl DeployContext {
    pub fn new(network: NetworkConfig, deployer: Pubkey, raffle_program_id: Pubkey) -> Self {
        Self {
            network,
            deployer,
            raffle_program_id,
            vrf_mock_program_id: None,
            existing_subscriptions: 0,
            verify: false,
        }
    }

    /// Network and verification flag from the process environment
    pub fn from_env(deployer: Pubkey, raffle_program_id: Pubkey) -> Result<Self, DeployError> {
        let network = NetworkConfig::from_env()?;
        let mut context = Self::new(network, deployer, raffle_program_id);
        context.verify = std::env::var(VERIFY_ENV).map(|v| !v.is_empty()).unwrap_or(false);
        Ok(context)
    }

    pub fn with_vrf_mock(mut self, program_id: Pubkey) -> Self {
        self.vrf_mock_program_id = Some(program_id);
        self
    }
}

/// Raffle constructor arguments, in order
#[derive(Clone, Debug, PartialEq)]
pub struct RaffleArgs {
    pub vrf_coordinator: Pubkey,
    pub entrance_fee: u64,
    pub gas_lane: [u8; 32],
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    pub interval: i64,
}

impl RaffleArgs {
    pub fn initialize_instruction(
        &self,
        program_id: &Pubkey,
        deployer: &Pubkey,
    ) -> Result<Instruction, ProgramError> {
        raffle_instruction::initialize_raffle(
            program_id,
            deployer,
            &self.vrf_coordinator,
            self.entrance_fee,
            self.gas_lane,
            self.subscription_id,
            self.callback_gas_limit,
            self.interval,
        )
    }
}

/// Instructions of one tagged step, submitted as one transaction
#[derive(Clone, Debug)]
pub struct DeployStep {
    pub tag: DeployTag,
    pub instructions: Vec<Instruction>,
}

/// The selected deploy steps and what they produce
#[derive(Clone, Debug)]
pub struct Deployment {
    pub steps: Vec<DeployStep>,
    pub raffle_args: Option<RaffleArgs>,
    pub raffle_address: Pubkey,
    pub commitment: CommitmentLevel,
    /// Whether `verify_after_deploy` checks the raffle
    pub verify: bool,
}

impl Deployment {
    /// Verify the deployed raffle when verification applies to this deployment
    pub fn verify_after_deploy(&self, raffle_account_data: &[u8]) -> Result<(), DeployError> {
        match (&self.raffle_args, self.verify) {
            (Some(args), true) => {
                info!("Verifying......");
                verify_deployment(raffle_account_data, args)?;
                info!("Verified raffle at {}", self.raffle_address);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Deploy the coordinator mock; nothing to do off the development chains
pub fn deploy_mocks(context: &DeployContext) -> Result<Option<DeployStep>, DeployError> {
    if !context.network.is_development() {
        return Ok(None);
    }

    let mock_program_id = context
        .vrf_mock_program_id
        .ok_or_else(|| DeployError::MissingMockProgram(context.network.name.clone()))?;

    info!("Local network detected! Deploying mocks....");
    let instructions = vec![vrf_mock_instruction::initialize_coordinator(
        &mock_program_id,
        &context.deployer,
        BASE_FEE,
        GAS_PRICE_LINK,
    )];
    info!("Mocks Deployed!");
    info!("{}", SEPARATOR);

    Ok(Some(DeployStep { tag: DeployTag::Mocks, instructions }))
}

/// Deploy the raffle, creating and funding a mock subscription on development chains
pub fn deploy_raffle(context: &DeployContext) -> Result<(DeployStep, RaffleArgs), DeployError> {
    let network = &context.network;
    let mut instructions = Vec::new();

    let (vrf_coordinator, subscription_id) = if network.is_development() {
        let mock_program_id = context
            .vrf_mock_program_id
            .ok_or_else(|| DeployError::MissingMockProgram(network.name.clone()))?;
        let subscription_id = context.existing_subscriptions + 1;

        // the mock allows funding without a LINK token
        instructions.push(vrf_mock_instruction::create_subscription(
            &mock_program_id,
            &context.deployer,
            subscription_id,
        ));
        instructions.push(vrf_mock_instruction::fund_subscription(
            &mock_program_id,
            &context.deployer,
            subscription_id,
            VRF_SUB_FUND_AMOUNT,
        ));
        (mock_program_id, subscription_id)
    } else {
        network.live_coordinator()?
    };

    let args = RaffleArgs {
        vrf_coordinator,
        entrance_fee: network.entrance_fee,
        gas_lane: network.gas_lane,
        subscription_id,
        callback_gas_limit: network.callback_gas_limit,
        interval: network.interval,
    };

    instructions.push(
        args.initialize_instruction(&context.raffle_program_id, &context.deployer)
            .map_err(DeployError::InstructionBuild)?,
    );

    let (raffle_address, _) = find_raffle_address(&context.raffle_program_id, &context.deployer);
    if network.is_development() {
        instructions.push(vrf_mock_instruction::add_consumer(
            &vrf_coordinator,
            &context.deployer,
            subscription_id,
            &raffle_address,
        ));
    }

    info!("Raffle deploys to {} with subscription {}", raffle_address, subscription_id);
    info!("{}", SEPARATOR);

    Ok((DeployStep { tag: DeployTag::Raffle, instructions }, args))
}

/// Select deploy steps by tag, mocks first
pub fn fixture(context: &DeployContext, tags: &[DeployTag]) -> Result<Deployment, DeployError> {
    let wants = |tag: DeployTag| tags.iter().any(|t| *t == tag || *t == DeployTag::All);

    let mut steps = Vec::new();
    if wants(DeployTag::Mocks) {
        if let Some(step) = deploy_mocks(context)? {
            steps.push(step);
        }
    }

    let mut raffle_args = None;
    if wants(DeployTag::Raffle) {
        let (step, args) = deploy_raffle(context)?;
        steps.push(step);
        raffle_args = Some(args);
    }

    let (raffle_address, _) = find_raffle_address(&context.raffle_program_id, &context.deployer);
    Ok(Deployment {
        steps,
        raffle_args,
        raffle_address,
        commitment: context.network.commitment,
        verify: context.verify && !context.network.is_development(),
    })
}

/// Check a deployed raffle account against its constructor arguments
pub fn verify_deployment(raffle_account_data: &[u8], args: &RaffleArgs) -> Result<(), DeployError> {
    let raffle = Raffle::try_from_account_data(raffle_account_data)
        .map_err(DeployError::InvalidRaffleAccount)?;

    check_field("vrf_coordinator", &args.vrf_coordinator, &raffle.vrf_coordinator)?;
    check_field("entrance_fee", &args.entrance_fee, &raffle.entrance_fee)?;
    check_field("gas_lane", &args.gas_lane, &raffle.gas_lane)?;
    check_field("subscription_id", &args.subscription_id, &raffle.subscription_id)?;
    check_field("callback_gas_limit", &args.callback_gas_limit, &raffle.callback_gas_limit)?;
    check_field("interval", &args.interval, &raffle.interval)?;

    Ok(())
}

fn check_field<T: PartialEq + std::fmt::Debug>(
    field: &'static str,
    expected: &T,
    actual: &T,
) -> Result<(), DeployError> {
    if expected != actual {
        return Err(DeployError::VerificationMismatch {
            field,
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        });
    }
    Ok(())
}
