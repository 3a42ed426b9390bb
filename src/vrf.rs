// VRF coordinator interface shared by the raffle (consumer) and the coordinator
use solana_program::{
    account_info::AccountInfo,
    keccak,
    msg,
    program::{get_return_data, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
};
use std::convert::TryInto;

use crate::{vrf_mock_instruction, vrf_mock_state::CoordinatorConfig};

pub const CONFIG_SEED: &[u8] = b"coordinator-config";
pub const SUBSCRIPTION_SEED: &[u8] = b"subscription";
pub const REQUEST_SEED: &[u8] = b"request";
pub const AUTHORITY_SEED: &[u8] = b"coordinator-authority";

/// Instruction tag every consumer program reserves for the fulfillment callback
pub const FULFILL_RANDOM_WORDS_TAG: u8 = 4;

pub fn find_config_address(coordinator: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED], coordinator)
}

pub fn find_subscription_address(coordinator: &Pubkey, subscription_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SUBSCRIPTION_SEED, &subscription_id.to_le_bytes()], coordinator)
}

pub fn find_request_address(coordinator: &Pubkey, request_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[REQUEST_SEED, &request_id.to_le_bytes()], coordinator)
}

/// The PDA a coordinator signs with when it calls back into a consumer
pub fn find_authority_address(coordinator: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[AUTHORITY_SEED], coordinator)
}

/// Parameters of a randomness request, as a consumer submits them
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomWordsRequest {
    /// Gas lane key hash
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

/// Request random words from a coordinator on behalf of a PDA consumer.
///
/// `consumer_seeds` must be the full signer seeds (bump included) of `consumer_info`.
/// Returns the request id reported by the coordinator.
#[allow(clippy::too_many_arguments)]
pub fn request_random_words<'a>(
    coordinator_program: &AccountInfo<'a>,
    config_info: &AccountInfo<'a>,
    subscription_info: &AccountInfo<'a>,
    request_info: &AccountInfo<'a>,
    consumer_info: &AccountInfo<'a>,
    payer_info: &AccountInfo<'a>,
    system_program_info: &AccountInfo<'a>,
    request: &RandomWordsRequest,
    consumer_seeds: &[&[u8]],
) -> Result<u64, ProgramError> {
    let expected_request_id = next_request_id(config_info)?;

    let instruction = vrf_mock_instruction::request_random_words(
        coordinator_program.key,
        consumer_info.key,
        payer_info.key,
        expected_request_id,
        request,
    );

    invoke_signed(
        &instruction,
        &[
            config_info.clone(),
            subscription_info.clone(),
            request_info.clone(),
            consumer_info.clone(),
            payer_info.clone(),
            system_program_info.clone(),
            coordinator_program.clone(),
        ],
        &[consumer_seeds],
    )?;

    let request_id = match get_return_data() {
        Some((program_id, data)) if program_id == *coordinator_program.key => data
            .get(..8)
            .and_then(|slice| slice.try_into().ok())
            .map(u64::from_le_bytes)
            .ok_or(ProgramError::InvalidAccountData)?,
        _ => {
            msg!("Coordinator did not report a request id");
            return Err(ProgramError::InvalidAccountData);
        }
    };

    msg!("Randomness requested from coordinator {}: request {}", coordinator_program.key, request_id);
    Ok(request_id)
}

// The next request id is the coordinator's counter plus one; it is needed
// up front because the request account address is derived from it.
fn next_request_id(config_info: &AccountInfo) -> Result<u64, ProgramError> {
    let config = CoordinatorConfig::unpack(&config_info.data.borrow())?;
    config
        .request_counter
        .checked_add(1)
        .ok_or(ProgramError::InvalidAccountData)
}

/// Whether `authority_info` is the signing callback authority of `coordinator`
pub fn is_coordinator_authority(authority_info: &AccountInfo, coordinator: &Pubkey) -> bool {
    let (expected, _) = find_authority_address(coordinator);
    authority_info.is_signer && *authority_info.key == expected
}

/// Callback data: tag, request id, word count, words (all little endian)
pub fn pack_fulfill_random_words(request_id: u64, random_words: &[u64]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + 8 + 4 + random_words.len() * 8);
    buf.push(FULFILL_RANDOM_WORDS_TAG);
    buf.extend_from_slice(&request_id.to_le_bytes());
    buf.extend_from_slice(&(random_words.len() as u32).to_le_bytes());
    for word in random_words {
        buf.extend_from_slice(&word.to_le_bytes());
    }
    buf
}

/// Parses the callback payload that follows the tag byte
pub fn unpack_fulfill_random_words(input: &[u8]) -> Result<(u64, Vec<u64>), ProgramError> {
    let request_id = input
        .get(..8)
        .and_then(|slice| slice.try_into().ok())
        .map(u64::from_le_bytes)
        .ok_or(ProgramError::InvalidInstructionData)?;
    let count = input
        .get(8..12)
        .and_then(|slice| slice.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(ProgramError::InvalidInstructionData)? as usize;

    let words = input.get(12..).ok_or(ProgramError::InvalidInstructionData)?;
    if words.len() != count * 8 {
        return Err(ProgramError::InvalidInstructionData);
    }

    let random_words = words
        .chunks_exact(8)
        .map(|chunk| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            u64::from_le_bytes(bytes)
        })
        .collect();

    Ok((request_id, random_words))
}

/// Convert the first 8 bytes of a hash into a u64 word
pub fn random_word_from_hash(hash: &[u8; 32]) -> u64 {
    let mut random_value = 0u64;
    for (i, byte) in hash[0..8].iter().enumerate() {
        random_value |= (*byte as u64) << (8 * i);
    }
    random_value
}

/// Deterministic words for a request: keccak(request_id, index) per word
pub fn derive_random_words(request_id: u64, num_words: u32) -> Vec<u64> {
    (0..num_words)
        .map(|index| {
            let hash = keccak::hashv(&[&request_id.to_le_bytes(), &index.to_le_bytes()]);
            random_word_from_hash(&hash.to_bytes())
        })
        .collect()
}
