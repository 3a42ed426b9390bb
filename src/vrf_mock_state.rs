use solana_program::{
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};
use arrayref::{array_ref, array_refs, mut_array_refs, array_mut_ref};

use crate::vrf_mock_error::VrfMockError;

/// Consumers a single subscription can hold
pub const MAX_CONSUMERS: usize = 8;
pub const MAX_REQUEST_CONFIRMATIONS: u16 = 200;
pub const MAX_NUM_WORDS: u32 = 500;

/// Coordinator-wide settings and counters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorConfig {
    pub is_initialized: bool,
    /// Account that deployed the coordinator
    pub admin: Pubkey,
    /// Flat premium charged per fulfillment (LINK, 9 decimals)
    pub base_fee: u64,
    /// LINK charged per unit of callback gas
    pub gas_price_link: u64,
    /// Id of the most recently created subscription (0 = none)
    pub current_subscription_id: u64,
    /// Id of the most recent randomness request (0 = none)
    pub request_counter: u64,
}

impl CoordinatorConfig {
    /// Fee owed for fulfilling a request with the given callback gas limit
    pub fn fulfillment_payment(&self, callback_gas_limit: u32) -> Result<u64, VrfMockError> {
        self.gas_price_link
            .checked_mul(callback_gas_limit as u64)
            .and_then(|gas_cost| gas_cost.checked_add(self.base_fee))
            .ok_or(VrfMockError::Overflow)
    }
}

/// A funded subscription that consumers draw randomness from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subscription {
    pub is_initialized: bool,
    pub id: u64,
    pub owner: Pubkey,
    /// LINK balance (9 decimals); no token backs it in the mock
    pub balance: u64,
    pub request_count: u64,
    pub consumer_count: u8,
    pub consumers: [Pubkey; MAX_CONSUMERS],
}

impl Subscription {
    pub fn new(id: u64, owner: Pubkey) -> Self {
        Self {
            is_initialized: true,
            id,
            owner,
            balance: 0,
            request_count: 0,
            consumer_count: 0,
            consumers: [Pubkey::default(); MAX_CONSUMERS],
        }
    }

    pub fn consumers(&self) -> &[Pubkey] {
        &self.consumers[..self.consumer_count as usize]
    }

    pub fn is_consumer(&self, consumer: &Pubkey) -> bool {
        self.consumers().contains(consumer)
    }

    /// Registers a consumer; adding one that is already present is a no-op
    pub fn add_consumer(&mut self, consumer: Pubkey) -> Result<(), VrfMockError> {
        if self.is_consumer(&consumer) {
            return Ok(());
        }
        let count = self.consumer_count as usize;
        if count >= MAX_CONSUMERS {
            return Err(VrfMockError::TooManyConsumers);
        }
        self.consumers[count] = consumer;
        self.consumer_count += 1;
        Ok(())
    }

    pub fn remove_consumer(&mut self, consumer: &Pubkey) -> Result<(), VrfMockError> {
        let count = self.consumer_count as usize;
        let position = self.consumers()
            .iter()
            .position(|c| c == consumer)
            .ok_or(VrfMockError::InvalidConsumer)?;

        // swap-remove keeps the occupied slots contiguous
        self.consumers[position] = self.consumers[count - 1];
        self.consumers[count - 1] = Pubkey::default();
        self.consumer_count -= 1;
        Ok(())
    }
}

/// A pending randomness request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomnessRequest {
    pub is_initialized: bool,
    pub id: u64,
    pub subscription_id: u64,
    /// Consumer account that signed the request
    pub consumer: Pubkey,
    /// Program owning the consumer account; receives the callback
    pub consumer_program: Pubkey,
    pub key_hash: [u8; 32],
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

impl Sealed for CoordinatorConfig {}
impl Sealed for Subscription {}
impl Sealed for RandomnessRequest {}

impl IsInitialized for CoordinatorConfig {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl IsInitialized for Subscription {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl IsInitialized for RandomnessRequest {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for CoordinatorConfig {
    const LEN: usize = 1 + 32 + 8 + 8 + 8 + 8;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, CoordinatorConfig::LEN];
        let (is_initialized, admin, base_fee, gas_price_link, current_subscription_id, request_counter) =
            array_refs![src, 1, 32, 8, 8, 8, 8];

        Ok(CoordinatorConfig {
            is_initialized: is_initialized[0] != 0,
            admin: Pubkey::new_from_array(*admin),
            base_fee: u64::from_le_bytes(*base_fee),
            gas_price_link: u64::from_le_bytes(*gas_price_link),
            current_subscription_id: u64::from_le_bytes(*current_subscription_id),
            request_counter: u64::from_le_bytes(*request_counter),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, CoordinatorConfig::LEN];
        let (
            is_initialized_dst,
            admin_dst,
            base_fee_dst,
            gas_price_link_dst,
            current_subscription_id_dst,
            request_counter_dst,
        ) = mut_array_refs![dst, 1, 32, 8, 8, 8, 8];

        is_initialized_dst[0] = self.is_initialized as u8;
        admin_dst.copy_from_slice(self.admin.as_ref());
        *base_fee_dst = self.base_fee.to_le_bytes();
        *gas_price_link_dst = self.gas_price_link.to_le_bytes();
        *current_subscription_id_dst = self.current_subscription_id.to_le_bytes();
        *request_counter_dst = self.request_counter.to_le_bytes();
    }
}

impl Pack for Subscription {
    const LEN: usize = 1 + 8 + 32 + 8 + 8 + 1 + 32 * MAX_CONSUMERS;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Subscription::LEN];
        let (is_initialized, id, owner, balance, request_count, consumer_count, consumers_src) =
            array_refs![src, 1, 8, 32, 8, 8, 1, 32 * MAX_CONSUMERS];

        let consumer_count = consumer_count[0];
        if consumer_count as usize > MAX_CONSUMERS {
            return Err(ProgramError::InvalidAccountData);
        }

        let mut consumers = [Pubkey::default(); MAX_CONSUMERS];
        for (slot, chunk) in consumers.iter_mut().zip(consumers_src.chunks_exact(32)) {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(chunk);
            *slot = Pubkey::new_from_array(bytes);
        }

        Ok(Subscription {
            is_initialized: is_initialized[0] != 0,
            id: u64::from_le_bytes(*id),
            owner: Pubkey::new_from_array(*owner),
            balance: u64::from_le_bytes(*balance),
            request_count: u64::from_le_bytes(*request_count),
            consumer_count,
            consumers,
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Subscription::LEN];
        let (
            is_initialized_dst,
            id_dst,
            owner_dst,
            balance_dst,
            request_count_dst,
            consumer_count_dst,
            consumers_dst,
        ) = mut_array_refs![dst, 1, 8, 32, 8, 8, 1, 32 * MAX_CONSUMERS];

        is_initialized_dst[0] = self.is_initialized as u8;
        *id_dst = self.id.to_le_bytes();
        owner_dst.copy_from_slice(self.owner.as_ref());
        *balance_dst = self.balance.to_le_bytes();
        *request_count_dst = self.request_count.to_le_bytes();
        consumer_count_dst[0] = self.consumer_count;
        for (chunk, consumer) in consumers_dst.chunks_exact_mut(32).zip(self.consumers.iter()) {
            chunk.copy_from_slice(consumer.as_ref());
        }
    }
}

impl Pack for RandomnessRequest {
    const LEN: usize = 1 + 8 + 8 + 32 + 32 + 32 + 2 + 4 + 4;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, RandomnessRequest::LEN];
        let (
            is_initialized,
            id,
            subscription_id,
            consumer,
            consumer_program,
            key_hash,
            request_confirmations,
            callback_gas_limit,
            num_words,
        ) = array_refs![src, 1, 8, 8, 32, 32, 32, 2, 4, 4];

        Ok(RandomnessRequest {
            is_initialized: is_initialized[0] != 0,
            id: u64::from_le_bytes(*id),
            subscription_id: u64::from_le_bytes(*subscription_id),
            consumer: Pubkey::new_from_array(*consumer),
            consumer_program: Pubkey::new_from_array(*consumer_program),
            key_hash: *key_hash,
            request_confirmations: u16::from_le_bytes(*request_confirmations),
            callback_gas_limit: u32::from_le_bytes(*callback_gas_limit),
            num_words: u32::from_le_bytes(*num_words),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, RandomnessRequest::LEN];
        let (
            is_initialized_dst,
            id_dst,
            subscription_id_dst,
            consumer_dst,
            consumer_program_dst,
            key_hash_dst,
            request_confirmations_dst,
            callback_gas_limit_dst,
            num_words_dst,
        ) = mut_array_refs![dst, 1, 8, 8, 32, 32, 32, 2, 4, 4];

        is_initialized_dst[0] = self.is_initialized as u8;
        *id_dst = self.id.to_le_bytes();
        *subscription_id_dst = self.subscription_id.to_le_bytes();
        consumer_dst.copy_from_slice(self.consumer.as_ref());
        consumer_program_dst.copy_from_slice(self.consumer_program.as_ref());
        key_hash_dst.copy_from_slice(&self.key_hash);
        *request_confirmations_dst = self.request_confirmations.to_le_bytes();
        *callback_gas_limit_dst = self.callback_gas_limit.to_le_bytes();
        *num_words_dst = self.num_words.to_le_bytes();
    }
}
