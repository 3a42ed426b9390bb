// Raffle Program - Utility Functions
use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    program::invoke_signed,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
};

pub const RAFFLE_SEED: &[u8] = b"raffle";

/// Find the program derived address of the raffle a deployer owns
pub fn find_raffle_address(program_id: &Pubkey, deployer: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[RAFFLE_SEED, deployer.as_ref()], program_id)
}

/// Create a rent-exempt PDA owned by `owner`, paid for by `payer`
pub fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    new_account: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    space: usize,
    owner: &Pubkey,
    signer_seeds: &[&[u8]],
    rent: &Rent,
) -> ProgramResult {
    invoke_signed(
        &system_instruction::create_account(
            payer.key,
            new_account.key,
            rent.minimum_balance(space),
            space as u64,
            owner,
        ),
        &[payer.clone(), new_account.clone(), system_program.clone()],
        &[signer_seeds],
    )
}

/// Lamports held above the rent-exempt minimum
pub fn available_balance(lamports: u64, rent: &Rent, data_len: usize) -> u64 {
    lamports.saturating_sub(rent.minimum_balance(data_len))
}

/// Convert lamports to SOL (for display purposes)
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / 1_000_000_000.0
}
