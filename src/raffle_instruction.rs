use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};
use std::convert::TryInto;
use std::mem::size_of;

use crate::utils::find_raffle_address;
use crate::vrf;

#[derive(Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Deploy the raffle for the signing deployer
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The deployer, pays for the raffle account
    /// 1. `[writable]` The raffle account (PDA of "raffle" + deployer)
    /// 2. `[]` The system program
    InitializeRaffle {
        /// Program id of the VRF coordinator
        vrf_coordinator: Pubkey,
        /// Minimum entry in lamports
        entrance_fee: u64,
        /// Key hash of the coordinator gas lane
        gas_lane: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
        /// Seconds between draws
        interval: i64,
    },

    /// Enter the raffle
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The player paying the entry
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    EnterRaffle {
        /// Lamports paid, at least the entrance fee
        amount: u64,
    },

    /// Evaluate upkeep; the result is set as return data
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep {},

    /// Start a draw by requesting randomness (anyone may call)
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The caller, pays for the request account
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The VRF coordinator program
    /// 3. `[writable]` The coordinator config account
    /// 4. `[writable]` The coordinator subscription account
    /// 5. `[writable]` The coordinator request account
    /// 6. `[]` The system program
    PerformUpkeep {},

    /// Coordinator callback delivering randomness
    ///
    /// Accounts expected:
    /// 0. `[signer]` The coordinator authority (PDA of the coordinator)
    /// 1. `[writable]` The raffle account
    /// Remaining `[writable]` accounts must include the winning player
    RawFulfillRandomWords {
        request_id: u64,
        random_words: Vec<u64>,
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input.split_first().ok_or(ProgramError::InvalidInstructionData)?;

        Ok(match *tag {
            0 => {
                let (vrf_coordinator, rest) = Self::unpack_pubkey(rest)?;
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (gas_lane, rest) = Self::unpack_fixed_bytes::<32>(rest)?;
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (callback_gas_limit, rest) = Self::unpack_u32(rest)?;
                let (interval, _) = Self::unpack_i64(rest)?;
                Self::InitializeRaffle {
                    vrf_coordinator,
                    entrance_fee,
                    gas_lane,
                    subscription_id,
                    callback_gas_limit,
                    interval,
                }
            }
            1 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::EnterRaffle { amount }
            }
            2 => Self::CheckUpkeep {},
            3 => Self::PerformUpkeep {},
            vrf::FULFILL_RANDOM_WORDS_TAG => {
                let (request_id, random_words) = vrf::unpack_fulfill_random_words(rest)?;
                Self::RawFulfillRandomWords { request_id, random_words }
            }
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(size_of::<Self>());
        match self {
            Self::InitializeRaffle {
                vrf_coordinator,
                entrance_fee,
                gas_lane,
                subscription_id,
                callback_gas_limit,
                interval,
            } => {
                buf.push(0);
                buf.extend_from_slice(vrf_coordinator.as_ref());
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(gas_lane);
                buf.extend_from_slice(&subscription_id.to_le_bytes());
                buf.extend_from_slice(&callback_gas_limit.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
            }
            Self::EnterRaffle { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep {} => buf.push(2),
            Self::PerformUpkeep {} => buf.push(3),
            Self::RawFulfillRandomWords { request_id, random_words } => {
                buf = vrf::pack_fulfill_random_words(*request_id, random_words);
            }
        }
        buf
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<8>(input)?;
        Ok((u64::from_le_bytes(bytes), rest))
    }

    fn unpack_i64(input: &[u8]) -> Result<(i64, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<8>(input)?;
        Ok((i64::from_le_bytes(bytes), rest))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<4>(input)?;
        Ok((u32::from_le_bytes(bytes), rest))
    }

    fn unpack_pubkey(input: &[u8]) -> Result<(Pubkey, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<32>(input)?;
        Ok((Pubkey::new_from_array(bytes), rest))
    }

    fn unpack_fixed_bytes<const N: usize>(input: &[u8]) -> Result<([u8; N], &[u8]), ProgramError> {
        if input.len() < N {
            return Err(ProgramError::InvalidInstructionData);
        }
        let (bytes, rest) = input.split_at(N);
        let bytes: [u8; N] = bytes.try_into().map_err(|_| ProgramError::InvalidInstructionData)?;
        Ok((bytes, rest))
    }
}

/// Create initialize_raffle instruction
#[allow(clippy::too_many_arguments)]
pub fn initialize_raffle(
    program_id: &Pubkey,
    deployer: &Pubkey,
    vrf_coordinator: &Pubkey,
    entrance_fee: u64,
    gas_lane: [u8; 32],
    subscription_id: u64,
    callback_gas_limit: u32,
    interval: i64,
) -> Result<Instruction, ProgramError> {
    if entrance_fee == 0 || interval < 0 {
        return Err(ProgramError::InvalidArgument);
    }

    let data = RaffleInstruction::InitializeRaffle {
        vrf_coordinator: *vrf_coordinator,
        entrance_fee,
        gas_lane,
        subscription_id,
        callback_gas_limit,
        interval,
    }
    .pack();

    let (raffle_account, _) = find_raffle_address(program_id, deployer);
    let accounts = vec![
        AccountMeta::new(*deployer, true),
        AccountMeta::new(raffle_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create enter_raffle instruction
pub fn enter_raffle(
    program_id: &Pubkey,
    player: &Pubkey,
    raffle_account: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::EnterRaffle { amount }.pack();

    let accounts = vec![
        AccountMeta::new(*player, true),
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey, raffle_account: &Pubkey) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::CheckUpkeep {}.pack();

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(*raffle_account, false)],
        data,
    })
}

/// Create perform_upkeep instruction.
///
/// `request_id` must be the id the coordinator assigns next (its request counter plus one).
pub fn perform_upkeep(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle_account: &Pubkey,
    vrf_coordinator: &Pubkey,
    subscription_id: u64,
    request_id: u64,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::PerformUpkeep {}.pack();

    let (config, _) = vrf::find_config_address(vrf_coordinator);
    let (subscription, _) = vrf::find_subscription_address(vrf_coordinator, subscription_id);
    let (request, _) = vrf::find_request_address(vrf_coordinator, request_id);

    let accounts = vec![
        AccountMeta::new(*caller, true),
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new_readonly(*vrf_coordinator, false),
        AccountMeta::new(config, false),
        AccountMeta::new(subscription, false),
        AccountMeta::new(request, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create raw_fulfill_random_words instruction.
///
/// Only succeeds when `authority` is the coordinator's signing PDA, so outside a
/// coordinator CPI this is useful mainly to exercise the rejection path.
pub fn raw_fulfill_random_words(
    program_id: &Pubkey,
    authority: &Pubkey,
    raffle_account: &Pubkey,
    request_id: u64,
    random_words: Vec<u64>,
    players: &[Pubkey],
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::RawFulfillRandomWords { request_id, random_words }.pack();

    let mut accounts = vec![
        AccountMeta::new_readonly(*authority, true),
        AccountMeta::new(*raffle_account, false),
    ];
    accounts.extend(players.iter().map(|player| AccountMeta::new(*player, false)));

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}
