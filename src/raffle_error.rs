use solana_program::{program_error::ProgramError, decode_error::DecodeError, msg, program_error::PrintProgramError};
use thiserror::Error;

/// Errors that may be returned by the Raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    /// Raffle account was already set up
    #[error("Raffle is already initialized")]
    AlreadyInitialized,

    /// Raffle account is not the PDA derived for its deployer
    #[error("Invalid raffle account")]
    InvalidRaffleAccount,

    /// Entry payment is below the entrance fee
    #[error("Not enough lamports entered")]
    NotEnoughLamportsEntered,

    /// Raffle is calculating a winner
    #[error("Raffle is not open")]
    RaffleNotOpen,

    /// Player list has reached capacity
    #[error("Raffle is full")]
    RaffleFull,

    /// Upkeep conditions are not met
    #[error("Upkeep not needed")]
    UpkeepNotNeeded,

    /// Coordinator account differs from the one the raffle was deployed with
    #[error("Invalid VRF coordinator")]
    InvalidCoordinator,

    #[error("Only the coordinator can fulfill")]
    OnlyCoordinatorCanFulfill,

    /// Fulfillment does not answer the pending request
    #[error("Unexpected randomness request")]
    UnexpectedRequest,

    #[error("No random words supplied")]
    NoRandomWords,

    #[error("Raffle has no players")]
    NoPlayers,

    /// Winning player's account was not passed with the fulfillment
    #[error("Winner account missing")]
    WinnerAccountMissing,

    #[error("Transfer failed")]
    TransferFailed,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}

impl PrintProgramError for RaffleError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
