#![cfg(not(feature = "no-entrypoint"))]

use solana_program::{
    account_info::AccountInfo, entrypoint, entrypoint::ProgramResult, pubkey::Pubkey,
};

// Define the standard Solana entrypoint
entrypoint!(process_instruction);

// The raffle is the deployed program unless the mock coordinator is requested
#[cfg(not(feature = "vrf-mock-program"))]
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    crate::process_instruction(program_id, accounts, instruction_data)
}

#[cfg(feature = "vrf-mock-program")]
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    crate::process_vrf_mock_instruction(program_id, accounts, instruction_data)
}
