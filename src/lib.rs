// VRF Raffle
// An interval-driven lottery that draws its winners through a VRF coordinator

// Raffle modules
pub mod raffle_state;
pub mod raffle_instruction;
pub mod raffle_processor;
pub mod raffle_entrypoint;
pub mod raffle_error;
pub mod utils;

// VRF coordinator interface and the local mock
pub mod vrf;
pub mod vrf_mock_error;
pub mod vrf_mock_instruction;
pub mod vrf_mock_processor;
pub mod vrf_mock_state;

// Off-chain deployment tooling
#[cfg(not(target_os = "solana"))]
pub mod network_config;
#[cfg(not(target_os = "solana"))]
pub mod deploy;

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey};

/// Raffle program processor
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    raffle_processor::Processor::process(program_id, accounts, instruction_data)
}

/// VRF coordinator mock processor
pub fn process_vrf_mock_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    vrf_mock_processor::VrfMockProcessor::process(program_id, accounts, instruction_data)
}
