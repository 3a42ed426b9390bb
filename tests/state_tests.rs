use solana_program::{program_error::ProgramError, program_pack::Pack, pubkey::Pubkey};

use vrf_raffle::{
    raffle_error::RaffleError,
    raffle_instruction::RaffleInstruction,
    raffle_state::{Raffle, RaffleState, MAX_PLAYERS},
    vrf,
    vrf_mock_error::VrfMockError,
    vrf_mock_instruction::VrfCoordinatorInstruction,
    vrf_mock_state::{CoordinatorConfig, Subscription, MAX_CONSUMERS},
};

fn open_raffle(last_timestamp: i64, players: usize) -> Raffle {
    Raffle {
        is_initialized: true,
        bump: 254,
        authority: Pubkey::new_unique(),
        vrf_coordinator: Pubkey::new_unique(),
        entrance_fee: 10_000_000,
        gas_lane: [7; 32],
        subscription_id: 1,
        callback_gas_limit: 500_000,
        interval: 30,
        last_timestamp,
        state: RaffleState::Open,
        recent_winner: Pubkey::default(),
        pending_request_id: 0,
        players: (0..players).map(|_| Pubkey::new_unique()).collect(),
    }
}

#[test]
fn test_upkeep_waits_for_the_full_interval() {
    let raffle = open_raffle(1_000, 1);

    assert!(!raffle.check_upkeep(1_030, 10).upkeep_needed);
    assert!(raffle.check_upkeep(1_031, 10).upkeep_needed);
}

#[test]
fn test_upkeep_needs_every_condition() {
    let mut raffle = open_raffle(1_000, 2);
    let later = 2_000;

    let status = raffle.check_upkeep(later, 0);
    assert!(!status.upkeep_needed);
    assert!(!status.has_balance);

    raffle.state = RaffleState::Calculating;
    let status = raffle.check_upkeep(later, 10);
    assert!(!status.upkeep_needed);
    assert!(!status.is_open);
    assert_eq!(status.to_bytes(), [0, 0, 1, 1, 1]);

    let empty = open_raffle(1_000, 0);
    assert!(!empty.check_upkeep(later, 10).has_players);
}

#[test]
fn test_winner_index_wraps_the_random_word() {
    let raffle = open_raffle(0, 3);
    assert_eq!(raffle.winner_index(0), Some(0));
    assert_eq!(raffle.winner_index(7), Some(1));
    assert_eq!(raffle.winner_index(u64::MAX), Some((u64::MAX % 3) as usize));

    assert_eq!(open_raffle(0, 0).winner_index(5), None);
}

#[test]
fn test_full_raffle_still_fits_its_account() {
    let raffle = open_raffle(0, MAX_PLAYERS);
    assert!(raffle.is_full());

    let mut data = vec![0u8; Raffle::LEN];
    borsh::BorshSerialize::serialize(&raffle, &mut &mut data[..]).unwrap();
    assert_eq!(Raffle::try_from_account_data(&data).unwrap(), raffle);
}

#[test]
fn test_uninitialized_raffle_is_rejected() {
    let data = vec![0u8; Raffle::LEN];
    assert_eq!(
        Raffle::try_from_account_data(&data).unwrap_err(),
        ProgramError::UninitializedAccount
    );
}

#[test]
fn test_raffle_instruction_rejects_bad_data() {
    assert_eq!(RaffleInstruction::unpack(&[]).unwrap_err(), ProgramError::InvalidInstructionData);
    assert_eq!(RaffleInstruction::unpack(&[9]).unwrap_err(), ProgramError::InvalidInstructionData);
    // enter without an amount
    assert_eq!(RaffleInstruction::unpack(&[1, 0, 0]).unwrap_err(), ProgramError::InvalidInstructionData);

    // callback claiming two words but carrying one
    let mut data = vrf::pack_fulfill_random_words(3, &[11]);
    data[9] = 2;
    assert_eq!(RaffleInstruction::unpack(&data).unwrap_err(), ProgramError::InvalidInstructionData);
}

#[test]
fn test_coordinator_callback_decodes_as_raffle_fulfillment() {
    let data = vrf::pack_fulfill_random_words(42, &[1, u64::MAX]);
    assert_eq!(data[0], vrf::FULFILL_RANDOM_WORDS_TAG);
    assert_eq!(
        RaffleInstruction::unpack(&data).unwrap(),
        RaffleInstruction::RawFulfillRandomWords {
            request_id: 42,
            random_words: vec![1, u64::MAX],
        }
    );
}

#[test]
fn test_derived_words_are_deterministic() {
    let first = vrf::derive_random_words(1, 3);
    assert_eq!(first.len(), 3);
    assert_eq!(first, vrf::derive_random_words(1, 3));
    assert_ne!(first, vrf::derive_random_words(2, 3));
    assert_ne!(first[0], first[1]);
}

#[test]
fn test_random_word_reads_little_endian() {
    let mut hash = [0u8; 32];
    hash[0] = 1;
    hash[1] = 2;
    hash[8] = 0xff;
    assert_eq!(vrf::random_word_from_hash(&hash), 0x0201);
}

#[test]
fn test_fulfillment_payment() {
    let config = CoordinatorConfig {
        is_initialized: true,
        admin: Pubkey::new_unique(),
        base_fee: 250_000_000,
        gas_price_link: 2,
        current_subscription_id: 0,
        request_counter: 0,
    };
    assert_eq!(config.fulfillment_payment(500_000), Ok(251_000_000));

    let overflowing = CoordinatorConfig { gas_price_link: u64::MAX, ..config };
    assert_eq!(overflowing.fulfillment_payment(2), Err(VrfMockError::Overflow));
}

#[test]
fn test_subscription_consumers() {
    let mut subscription = Subscription::new(1, Pubkey::new_unique());
    let consumers: Vec<Pubkey> = (0..MAX_CONSUMERS).map(|_| Pubkey::new_unique()).collect();

    for consumer in &consumers {
        subscription.add_consumer(*consumer).unwrap();
    }
    // re-adding is a no-op even when full
    subscription.add_consumer(consumers[0]).unwrap();
    assert_eq!(subscription.consumers(), &consumers[..]);
    assert_eq!(
        subscription.add_consumer(Pubkey::new_unique()),
        Err(VrfMockError::TooManyConsumers)
    );

    subscription.remove_consumer(&consumers[1]).unwrap();
    assert_eq!(subscription.consumers().len(), MAX_CONSUMERS - 1);
    assert!(!subscription.is_consumer(&consumers[1]));
    assert_eq!(subscription.consumers()[1], consumers[MAX_CONSUMERS - 1]);
    assert_eq!(
        subscription.remove_consumer(&consumers[1]),
        Err(VrfMockError::InvalidConsumer)
    );

    let mut data = vec![0u8; Subscription::LEN];
    Subscription::pack(subscription, &mut data).unwrap();
    assert_eq!(Subscription::unpack(&data).unwrap(), subscription);
}

#[test]
fn test_coordinator_instruction_rejects_garbage() {
    assert_eq!(
        VrfCoordinatorInstruction::unpack(&[200]).unwrap_err(),
        ProgramError::Custom(VrfMockError::InvalidInstruction as u32)
    );
}

#[test]
fn test_error_codes_are_stable() {
    assert_eq!(ProgramError::from(RaffleError::NotEnoughLamportsEntered), ProgramError::Custom(3));
    assert_eq!(ProgramError::from(RaffleError::UpkeepNotNeeded), ProgramError::Custom(6));
    assert_eq!(ProgramError::from(VrfMockError::NonexistentRequest), ProgramError::Custom(10));
}
