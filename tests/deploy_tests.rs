use borsh::BorshSerialize;
use solana_program::{program_error::ProgramError, pubkey::Pubkey};
use solana_sdk::commitment_config::CommitmentLevel;
use std::collections::HashMap;

use vrf_raffle::{
    deploy::{self, DeployContext, DeployError, DeployTag, RaffleArgs},
    network_config::{self, ConfigError, NetworkConfig},
    raffle_state::{Raffle, RaffleState},
    utils,
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn localnet_context() -> DeployContext {
    let network = NetworkConfig::for_network("localnet").unwrap();
    DeployContext::new(network, Pubkey::new_unique(), Pubkey::new_unique())
        .with_vrf_mock(Pubkey::new_unique())
}

fn devnet_context(coordinator: Pubkey) -> DeployContext {
    let network = NetworkConfig::from_lookup(lookup_from(&[
        (network_config::NETWORK_ENV, "devnet"),
        (network_config::VRF_COORDINATOR_ENV, &coordinator.to_string()),
        (network_config::SUBSCRIPTION_ID_ENV, "588"),
    ]))
    .unwrap();
    DeployContext::new(network, Pubkey::new_unique(), Pubkey::new_unique())
}

fn deployed_raffle(args: &RaffleArgs) -> Raffle {
    Raffle {
        is_initialized: true,
        bump: 255,
        authority: Pubkey::new_unique(),
        vrf_coordinator: args.vrf_coordinator,
        entrance_fee: args.entrance_fee,
        gas_lane: args.gas_lane,
        subscription_id: args.subscription_id,
        callback_gas_limit: args.callback_gas_limit,
        interval: args.interval,
        last_timestamp: 1_700_000_000,
        state: RaffleState::Open,
        recent_winner: Pubkey::default(),
        pending_request_id: 0,
        players: vec![],
    }
}

// network config

#[test]
fn test_network_defaults_to_localnet() {
    let config = NetworkConfig::from_lookup(|_| None).unwrap();
    assert_eq!(config.name, network_config::DEFAULT_NETWORK);
    assert!(config.is_development());
    assert_eq!(config.commitment, CommitmentLevel::Confirmed);
}

#[test]
fn test_development_chains() {
    assert!(network_config::is_development_chain("localnet"));
    assert!(network_config::is_development_chain("localhost"));
    assert!(!network_config::is_development_chain("devnet"));
    assert!(!network_config::is_development_chain("mainnet-beta"));
}

#[test]
fn test_unknown_network_is_rejected() {
    let err = NetworkConfig::from_lookup(lookup_from(&[(network_config::NETWORK_ENV, "goerli")])).unwrap_err();
    assert_eq!(err, ConfigError::UnknownNetwork("goerli".to_string()));
}

#[test]
fn test_live_network_reads_coordinator_overrides() {
    let coordinator = Pubkey::new_unique();
    let context = devnet_context(coordinator);

    assert_eq!(context.network.vrf_coordinator, Some(coordinator));
    assert_eq!(context.network.subscription_id, Some(588));
    assert_eq!(context.network.live_coordinator().unwrap(), (coordinator, 588));
    assert_eq!(context.network.commitment, CommitmentLevel::Finalized);
}

#[test]
fn test_development_network_ignores_coordinator_overrides() {
    let config = NetworkConfig::from_lookup(lookup_from(&[
        (network_config::NETWORK_ENV, "localhost"),
        (network_config::SUBSCRIPTION_ID_ENV, "not-a-number"),
    ]))
    .unwrap();
    assert_eq!(config.subscription_id, None);
    assert_eq!(config.vrf_coordinator, None);
}

#[test]
fn test_invalid_overrides_are_reported() {
    let err = NetworkConfig::from_lookup(lookup_from(&[
        (network_config::NETWORK_ENV, "devnet"),
        (network_config::SUBSCRIPTION_ID_ENV, "abc"),
    ]))
    .unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidSetting {
            setting: network_config::SUBSCRIPTION_ID_ENV,
            value: "abc".to_string(),
        }
    );

    let err = NetworkConfig::from_lookup(lookup_from(&[
        (network_config::NETWORK_ENV, "mainnet-beta"),
        (network_config::VRF_COORDINATOR_ENV, "not a key"),
    ]))
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSetting { setting, .. } if setting == network_config::VRF_COORDINATOR_ENV));
}

// deploy scripts

#[test]
fn test_deploy_tags_parse() {
    assert_eq!("all".parse::<DeployTag>().unwrap(), DeployTag::All);
    assert_eq!("mocks".parse::<DeployTag>().unwrap(), DeployTag::Mocks);
    assert_eq!("raffle".parse::<DeployTag>().unwrap(), DeployTag::Raffle);
    assert_eq!(
        "lottery".parse::<DeployTag>().unwrap_err(),
        DeployError::UnknownTag("lottery".to_string())
    );
}

#[test]
fn test_localnet_deploys_mocks_then_raffle() {
    let context = localnet_context();
    let mock = context.vrf_mock_program_id.unwrap();
    let deployment = deploy::fixture(&context, &[DeployTag::All]).unwrap();

    let tags: Vec<DeployTag> = deployment.steps.iter().map(|step| step.tag).collect();
    assert_eq!(tags, vec![DeployTag::Mocks, DeployTag::Raffle]);
    assert_eq!(deployment.steps[0].instructions.len(), 1);
    assert_eq!(deployment.steps[0].instructions[0].program_id, mock);

    // create, fund, initialize, add consumer
    let raffle_step = &deployment.steps[1];
    let programs: Vec<Pubkey> = raffle_step.instructions.iter().map(|ix| ix.program_id).collect();
    assert_eq!(programs, vec![mock, mock, context.raffle_program_id, mock]);

    let args = deployment.raffle_args.unwrap();
    assert_eq!(args.vrf_coordinator, mock);
    assert_eq!(args.subscription_id, 1);
    assert_eq!(args.entrance_fee, context.network.entrance_fee);
    assert_eq!(args.interval, context.network.interval);

    let (raffle, _) = utils::find_raffle_address(&context.raffle_program_id, &context.deployer);
    assert_eq!(deployment.raffle_address, raffle);
    assert!(!deployment.verify);
}

#[test]
fn test_raffle_takes_the_next_subscription_id() {
    let mut context = localnet_context();
    context.existing_subscriptions = 2;
    let (_, args) = deploy::deploy_raffle(&context).unwrap();
    assert_eq!(args.subscription_id, 3);
}

#[test]
fn test_invalid_raffle_arguments_fail_the_plan() {
    let mut context = localnet_context();
    context.network.entrance_fee = 0;
    assert_eq!(
        deploy::deploy_raffle(&context).unwrap_err(),
        DeployError::InstructionBuild(ProgramError::InvalidArgument)
    );

    let mut context = localnet_context();
    context.network.interval = -1;
    assert_eq!(
        deploy::fixture(&context, &[DeployTag::All]).unwrap_err(),
        DeployError::InstructionBuild(ProgramError::InvalidArgument)
    );
}

#[test]
fn test_raffle_tag_skips_mocks() {
    let deployment = deploy::fixture(&localnet_context(), &[DeployTag::Raffle]).unwrap();
    assert_eq!(deployment.steps.len(), 1);
    assert_eq!(deployment.steps[0].tag, DeployTag::Raffle);

    let deployment = deploy::fixture(&localnet_context(), &[DeployTag::Mocks]).unwrap();
    assert_eq!(deployment.steps.len(), 1);
    assert!(deployment.raffle_args.is_none());
}

#[test]
fn test_development_deploy_needs_mock_program() {
    let network = NetworkConfig::for_network("localnet").unwrap();
    let context = DeployContext::new(network, Pubkey::new_unique(), Pubkey::new_unique());
    assert_eq!(
        deploy::fixture(&context, &[DeployTag::All]).unwrap_err(),
        DeployError::MissingMockProgram("localnet".to_string())
    );
}

#[test]
fn test_live_network_uses_configured_coordinator() {
    let coordinator = Pubkey::new_unique();
    let mut context = devnet_context(coordinator);
    context.verify = true;

    assert!(deploy::deploy_mocks(&context).unwrap().is_none());

    let deployment = deploy::fixture(&context, &[DeployTag::All]).unwrap();
    assert_eq!(deployment.steps.len(), 1);
    assert_eq!(deployment.steps[0].instructions.len(), 1);
    assert_eq!(deployment.steps[0].instructions[0].program_id, context.raffle_program_id);
    assert_eq!(deployment.commitment, CommitmentLevel::Finalized);
    assert!(deployment.verify);

    let args = deployment.raffle_args.clone().unwrap();
    assert_eq!(args.vrf_coordinator, coordinator);
    assert_eq!(args.subscription_id, 588);

    let data = deployed_raffle(&args).try_to_vec().unwrap();
    deployment.verify_after_deploy(&data).unwrap();
}

#[test]
fn test_live_network_without_coordinator_fails() {
    let network = NetworkConfig::for_network("devnet").unwrap();
    let context = DeployContext::new(network, Pubkey::new_unique(), Pubkey::new_unique());
    assert_eq!(
        deploy::fixture(&context, &[DeployTag::All]).unwrap_err(),
        DeployError::Config(ConfigError::MissingSetting {
            network: "devnet".to_string(),
            setting: "vrf_coordinator",
        })
    );
}

#[test]
fn test_verification_reports_mismatches() {
    let coordinator = Pubkey::new_unique();
    let context = devnet_context(coordinator);
    let (_, args) = deploy::deploy_raffle(&context).unwrap();

    let mut raffle = deployed_raffle(&args);
    raffle.entrance_fee += 1;
    let data = raffle.try_to_vec().unwrap();

    let err = deploy::verify_deployment(&data, &args).unwrap_err();
    assert_eq!(
        err,
        DeployError::VerificationMismatch {
            field: "entrance_fee",
            expected: args.entrance_fee.to_string(),
            actual: (args.entrance_fee + 1).to_string(),
        }
    );

    assert!(matches!(
        deploy::verify_deployment(&[0u8; 8], &args),
        Err(DeployError::InvalidRaffleAccount(_))
    ));
}

#[test]
fn test_verification_is_skipped_on_development_chains() {
    let mut context = localnet_context();
    context.verify = true;
    let deployment = deploy::fixture(&context, &[DeployTag::All]).unwrap();
    assert!(!deployment.verify);
    deployment.verify_after_deploy(&[]).unwrap();
}
