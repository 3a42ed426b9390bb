// VRF Coordinator Mock - Instructions
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::vrf::{self, RandomWordsRequest};
use crate::vrf_mock_error::VrfMockError;

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum VrfCoordinatorInstruction {
    /// Deploy the coordinator configuration
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The admin paying for the config account
    /// 1. `[writable]` The config account (PDA)
    /// 2. `[]` The system program
    InitializeCoordinator {
        /// Flat premium per fulfillment
        base_fee: u64,
        /// LINK per unit of callback gas
        gas_price_link: u64,
    },

    /// Create a subscription; the new id is set as return data
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The subscription owner
    /// 1. `[writable]` The config account
    /// 2. `[writable]` The subscription account (PDA of the next id)
    /// 3. `[]` The system program
    CreateSubscription,

    /// Top up a subscription balance
    ///
    /// Accounts expected:
    /// 0. `[signer]` The funder
    /// 1. `[writable]` The subscription account
    FundSubscription { subscription_id: u64, amount: u64 },

    /// Accounts expected:
    /// 0. `[signer]` The subscription owner
    /// 1. `[writable]` The subscription account
    AddConsumer { subscription_id: u64, consumer: Pubkey },

    /// Accounts expected:
    /// 0. `[signer]` The subscription owner
    /// 1. `[writable]` The subscription account
    RemoveConsumer { subscription_id: u64, consumer: Pubkey },

    /// Register a randomness request; the request id is set as return data
    ///
    /// Accounts expected:
    /// 0. `[writable]` The config account
    /// 1. `[writable]` The subscription account
    /// 2. `[writable]` The request account (PDA of the next request id)
    /// 3. `[signer]` The consumer
    /// 4. `[signer, writable]` The payer for the request account
    /// 5. `[]` The system program
    RequestRandomWords {
        key_hash: [u8; 32],
        subscription_id: u64,
        request_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
    },

    /// Answer a request and call back into the consumer program.
    /// Empty `words` derives them from the request id.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The fulfiller (receives the closed request's rent)
    /// 1. `[]` The config account
    /// 2. `[writable]` The subscription account
    /// 3. `[writable]` The request account
    /// 4. `[]` The coordinator authority (PDA)
    /// 5. `[]` The consumer program
    /// 6. `[writable]` The consumer account
    /// Remaining accounts are forwarded to the consumer callback
    FulfillRandomWords { request_id: u64, words: Vec<u64> },
}

impl VrfCoordinatorInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| VrfMockError::InvalidInstruction.into())
    }
}

pub fn initialize_coordinator(
    program_id: &Pubkey,
    admin: &Pubkey,
    base_fee: u64,
    gas_price_link: u64,
) -> Instruction {
    let (config, _) = vrf::find_config_address(program_id);
    Instruction::new_with_borsh(
        *program_id,
        &VrfCoordinatorInstruction::InitializeCoordinator { base_fee, gas_price_link },
        vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(config, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

/// `subscription_id` must be the id the coordinator will assign next
pub fn create_subscription(program_id: &Pubkey, owner: &Pubkey, subscription_id: u64) -> Instruction {
    let (config, _) = vrf::find_config_address(program_id);
    let (subscription, _) = vrf::find_subscription_address(program_id, subscription_id);
    Instruction::new_with_borsh(
        *program_id,
        &VrfCoordinatorInstruction::CreateSubscription,
        vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(config, false),
            AccountMeta::new(subscription, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

pub fn fund_subscription(
    program_id: &Pubkey,
    funder: &Pubkey,
    subscription_id: u64,
    amount: u64,
) -> Instruction {
    let (subscription, _) = vrf::find_subscription_address(program_id, subscription_id);
    Instruction::new_with_borsh(
        *program_id,
        &VrfCoordinatorInstruction::FundSubscription { subscription_id, amount },
        vec![
            AccountMeta::new_readonly(*funder, true),
            AccountMeta::new(subscription, false),
        ],
    )
}

pub fn add_consumer(
    program_id: &Pubkey,
    owner: &Pubkey,
    subscription_id: u64,
    consumer: &Pubkey,
) -> Instruction {
    let (subscription, _) = vrf::find_subscription_address(program_id, subscription_id);
    Instruction::new_with_borsh(
        *program_id,
        &VrfCoordinatorInstruction::AddConsumer { subscription_id, consumer: *consumer },
        vec![
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(subscription, false),
        ],
    )
}

pub fn remove_consumer(
    program_id: &Pubkey,
    owner: &Pubkey,
    subscription_id: u64,
    consumer: &Pubkey,
) -> Instruction {
    let (subscription, _) = vrf::find_subscription_address(program_id, subscription_id);
    Instruction::new_with_borsh(
        *program_id,
        &VrfCoordinatorInstruction::RemoveConsumer { subscription_id, consumer: *consumer },
        vec![
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(subscription, false),
        ],
    )
}

/// `request_id` must be the id the coordinator will assign next
pub fn request_random_words(
    program_id: &Pubkey,
    consumer: &Pubkey,
    payer: &Pubkey,
    request_id: u64,
    request: &RandomWordsRequest,
) -> Instruction {
    let (config, _) = vrf::find_config_address(program_id);
    let (subscription, _) = vrf::find_subscription_address(program_id, request.subscription_id);
    let (request_account, _) = vrf::find_request_address(program_id, request_id);
    Instruction::new_with_borsh(
        *program_id,
        &VrfCoordinatorInstruction::RequestRandomWords {
            key_hash: request.key_hash,
            subscription_id: request.subscription_id,
            request_confirmations: request.request_confirmations,
            callback_gas_limit: request.callback_gas_limit,
            num_words: request.num_words,
        },
        vec![
            AccountMeta::new(config, false),
            AccountMeta::new(subscription, false),
            AccountMeta::new(request_account, false),
            AccountMeta::new_readonly(*consumer, true),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

/// Build a fulfillment. `callback_accounts` are forwarded writable to the consumer.
#[allow(clippy::too_many_arguments)]
pub fn fulfill_random_words(
    program_id: &Pubkey,
    fulfiller: &Pubkey,
    request_id: u64,
    subscription_id: u64,
    consumer_program: &Pubkey,
    consumer: &Pubkey,
    words: Vec<u64>,
    callback_accounts: &[Pubkey],
) -> Instruction {
    let (config, _) = vrf::find_config_address(program_id);
    let (subscription, _) = vrf::find_subscription_address(program_id, subscription_id);
    let (request_account, _) = vrf::find_request_address(program_id, request_id);
    let (authority, _) = vrf::find_authority_address(program_id);

    let mut accounts = vec![
        AccountMeta::new(*fulfiller, true),
        AccountMeta::new_readonly(config, false),
        AccountMeta::new(subscription, false),
        AccountMeta::new(request_account, false),
        AccountMeta::new_readonly(authority, false),
        AccountMeta::new_readonly(*consumer_program, false),
        AccountMeta::new(*consumer, false),
    ];
    accounts.extend(callback_accounts.iter().map(|key| AccountMeta::new(*key, false)));

    Instruction::new_with_borsh(
        *program_id,
        &VrfCoordinatorInstruction::FulfillRandomWords { request_id, words },
        accounts,
    )
}
