use solana_program::{program_error::ProgramError, decode_error::DecodeError, msg, program_error::PrintProgramError};
use thiserror::Error;

/// Errors that may be returned by the VRF coordinator mock
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum VrfMockError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstruction,

    /// Coordinator config already exists
    #[error("Coordinator is already initialized")]
    AlreadyInitialized,

    /// Coordinator config has not been created
    #[error("Coordinator is not initialized")]
    NotInitialized,

    /// An account does not match its expected program address
    #[error("Account does not match the expected coordinator address")]
    InvalidAccount,

    #[error("Invalid subscription")]
    InvalidSubscription,

    #[error("Must be subscription owner")]
    MustBeSubOwner,

    #[error("Too many consumers")]
    TooManyConsumers,

    /// Consumer is not registered on the subscription or did not sign
    #[error("Invalid consumer")]
    InvalidConsumer,

    #[error("Invalid request confirmations")]
    InvalidRequestConfirmations,

    #[error("Number of words too big")]
    NumWordsTooBig,

    #[error("Nonexistent request")]
    NonexistentRequest,

    /// Supplied words do not match the requested word count
    #[error("Invalid random words")]
    InvalidRandomWords,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Arithmetic overflow")]
    Overflow,
}

impl From<VrfMockError> for ProgramError {
    fn from(e: VrfMockError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for VrfMockError {
    fn type_of() -> &'static str {
        "VRF Coordinator Mock Error"
    }
}

impl PrintProgramError for VrfMockError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
