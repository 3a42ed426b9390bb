#![allow(dead_code)]

use solana_program::program_pack::Pack;
use solana_program_test::*;
use solana_sdk::{
    clock::Clock,
    hash::Hash,
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::{Transaction, TransactionError},
};

use vrf_raffle::{
    deploy::{self, DeployContext, DeployTag, RaffleArgs},
    network_config::NetworkConfig,
    process_instruction, process_vrf_mock_instruction,
    raffle_instruction,
    raffle_state::{Raffle, UpkeepStatus},
    utils,
    vrf,
    vrf_mock_instruction,
    vrf_mock_state::{CoordinatorConfig, Subscription},
};

pub const LAMPORTS_PER_PLAYER: u64 = 10_000_000_000; // 10 SOL

pub struct RaffleFixture {
    pub context: ProgramTestContext,
    pub raffle_program_id: Pubkey,
    pub vrf_mock_program_id: Pubkey,
    pub raffle: Pubkey,
    pub args: RaffleArgs,
}

/// Both programs registered, nothing deployed
pub async fn start() -> (ProgramTestContext, Pubkey, Pubkey) {
    let raffle_program_id = Pubkey::new_unique();
    let vrf_mock_program_id = Pubkey::new_unique();

    let mut program_test = ProgramTest::new(
        "vrf_raffle",
        raffle_program_id,
        processor!(process_instruction),
    );
    program_test.add_program(
        "vrf_coordinator_mock",
        vrf_mock_program_id,
        processor!(process_vrf_mock_instruction),
    );

    let context = program_test.start_with_context().await;
    (context, raffle_program_id, vrf_mock_program_id)
}

/// Deploy everything tagged "all" on the local network
pub async fn setup() -> RaffleFixture {
    let (mut context, raffle_program_id, vrf_mock_program_id) = start().await;

    let network = NetworkConfig::for_network("localnet").unwrap();
    let deploy_context = DeployContext::new(network, context.payer.pubkey(), raffle_program_id)
        .with_vrf_mock(vrf_mock_program_id);
    let deployment = deploy::fixture(&deploy_context, &[DeployTag::All]).unwrap();

    for step in &deployment.steps {
        process(&mut context, &step.instructions, &[]).await.unwrap();
    }

    RaffleFixture {
        context,
        raffle_program_id,
        vrf_mock_program_id,
        raffle: deployment.raffle_address,
        args: deployment.raffle_args.unwrap(),
    }
}

/// Sign with the payer plus `signers` and submit on a fresh blockhash
pub async fn process(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let blockhash = fresh_blockhash(context).await;

    let mut all_signers: Vec<&Keypair> = vec![&context.payer];
    all_signers.extend_from_slice(signers);

    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&context.payer.pubkey()),
        &all_signers,
        blockhash,
    );
    context.banks_client.process_transaction(transaction).await
}

/// Wait for a blockhash newer than the last one used
pub async fn fresh_blockhash(context: &mut ProgramTestContext) -> Hash {
    let blockhash = context
        .banks_client
        .get_new_latest_blockhash(&context.last_blockhash)
        .await
        .unwrap();
    context.last_blockhash = blockhash;
    blockhash
}

/// Simulate `instructions` signed by the payer; returns the program and bytes of the return data
pub async fn simulate_return_data(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
) -> Option<(Pubkey, Vec<u8>)> {
    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&context.payer.pubkey()),
        &[&context.payer],
        context.last_blockhash,
    );
    let simulation = context.banks_client.simulate_transaction(transaction).await.unwrap();
    assert!(matches!(simulation.result, Some(Ok(()))));
    simulation
        .simulation_details
        .and_then(|details| details.return_data)
        .map(|return_data| (return_data.program_id, return_data.data))
}

/// The instruction error a failed transaction carries
pub fn instruction_error(error: BanksClientError) -> Option<InstructionError> {
    let transaction_error = match error {
        BanksClientError::TransactionError(err) => err,
        BanksClientError::SimulationError { err, .. } => err,
        _ => return None,
    };
    match transaction_error {
        TransactionError::InstructionError(_, err) => Some(err),
        _ => None,
    }
}

/// The custom program error a failed transaction carries
pub fn custom_error_code(error: BanksClientError) -> Option<u32> {
    match instruction_error(error) {
        Some(InstructionError::Custom(code)) => Some(code),
        _ => None,
    }
}

pub async fn assert_custom_error(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
    expected: u32,
) {
    let error = process(context, instructions, signers)
        .await
        .expect_err("transaction should fail");
    assert_eq!(custom_error_code(error), Some(expected));
}

/// Move the cluster clock forward, like `evm_increaseTime`
pub async fn advance_clock(context: &mut ProgramTestContext, seconds: i64) {
    let mut clock: Clock = context.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp += seconds;
    context.set_sysvar(&clock);
}

pub async fn new_player(context: &mut ProgramTestContext) -> Keypair {
    let player = Keypair::new();
    let fund = system_instruction::transfer(
        &context.payer.pubkey(),
        &player.pubkey(),
        LAMPORTS_PER_PLAYER,
    );
    process(context, &[fund], &[]).await.unwrap();
    player
}

pub async fn balance(context: &mut ProgramTestContext, address: &Pubkey) -> u64 {
    context.banks_client.get_balance(*address).await.unwrap()
}

pub async fn get_raffle(context: &mut ProgramTestContext, raffle: &Pubkey) -> Raffle {
    let account = context
        .banks_client
        .get_account(*raffle)
        .await
        .unwrap()
        .expect("raffle account exists");
    Raffle::try_from_account_data(&account.data).unwrap()
}

pub async fn get_coordinator_config(
    context: &mut ProgramTestContext,
    vrf_mock_program_id: &Pubkey,
) -> CoordinatorConfig {
    let (config, _) = vrf::find_config_address(vrf_mock_program_id);
    let account = context.banks_client.get_account(config).await.unwrap().unwrap();
    CoordinatorConfig::unpack(&account.data).unwrap()
}

pub async fn get_subscription(
    context: &mut ProgramTestContext,
    vrf_mock_program_id: &Pubkey,
    subscription_id: u64,
) -> Subscription {
    let (subscription, _) = vrf::find_subscription_address(vrf_mock_program_id, subscription_id);
    let account = context.banks_client.get_account(subscription).await.unwrap().unwrap();
    Subscription::unpack(&account.data).unwrap()
}

/// Upkeep as the program would evaluate it right now
pub async fn upkeep_status(context: &mut ProgramTestContext, raffle: &Pubkey) -> UpkeepStatus {
    let account = context.banks_client.get_account(*raffle).await.unwrap().unwrap();
    let rent = context.banks_client.get_rent().await.unwrap();
    let clock: Clock = context.banks_client.get_sysvar().await.unwrap();

    let state = Raffle::try_from_account_data(&account.data).unwrap();
    let available = utils::available_balance(account.lamports, &rent, account.data.len());
    state.check_upkeep(clock.unix_timestamp, available)
}

pub async fn enter(fixture: &mut RaffleFixture, player: &Keypair, amount: u64) -> Result<(), BanksClientError> {
    let ix = raffle_instruction::enter_raffle(
        &fixture.raffle_program_id,
        &player.pubkey(),
        &fixture.raffle,
        amount,
    )
    .unwrap();
    process(&mut fixture.context, &[ix], &[player]).await
}

/// Build perform_upkeep against the coordinator's next request id
pub async fn perform_upkeep_ix(fixture: &mut RaffleFixture) -> Instruction {
    let config = get_coordinator_config(&mut fixture.context, &fixture.vrf_mock_program_id).await;
    raffle_instruction::perform_upkeep(
        &fixture.raffle_program_id,
        &fixture.context.payer.pubkey(),
        &fixture.raffle,
        &fixture.vrf_mock_program_id,
        fixture.args.subscription_id,
        config.request_counter + 1,
    )
    .unwrap()
}

pub fn fulfill_ix(
    fixture: &RaffleFixture,
    request_id: u64,
    words: Vec<u64>,
    players: &[Pubkey],
) -> Instruction {
    vrf_mock_instruction::fulfill_random_words(
        &fixture.vrf_mock_program_id,
        &fixture.context.payer.pubkey(),
        request_id,
        fixture.args.subscription_id,
        &fixture.raffle_program_id,
        &fixture.raffle,
        words,
        players,
    )
}

/// Enter every player, then let the interval pass
pub async fn fill_and_expire(fixture: &mut RaffleFixture, players: &[&Keypair]) {
    let fee = fixture.args.entrance_fee;
    for player in players {
        enter(fixture, player, fee).await.unwrap();
    }
    let interval = fixture.args.interval;
    advance_clock(&mut fixture.context, interval + 1).await;
}
