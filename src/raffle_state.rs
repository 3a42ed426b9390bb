use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    clock::UnixTimestamp,
    entrypoint::ProgramResult,
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
};

/// Players one raffle round can hold
pub const MAX_PLAYERS: usize = 32;
/// Random words requested per draw
pub const NUM_WORDS: u32 = 1;
/// Confirmations the coordinator waits for before answering
pub const REQUEST_CONFIRMATIONS: u16 = 3;

/// Lifecycle state of the raffle
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Accepting entries
    Open,
    /// Waiting for the coordinator to deliver randomness
    Calculating,
}

impl From<RaffleState> for u8 {
    fn from(state: RaffleState) -> Self {
        match state {
            RaffleState::Open => 0,
            RaffleState::Calculating => 1,
        }
    }
}

/// Raffle account data
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct Raffle {
    pub is_initialized: bool,
    pub bump: u8,
    /// Deployer; part of the PDA seeds
    pub authority: Pubkey,
    /// Program id of the VRF coordinator allowed to fulfill
    pub vrf_coordinator: Pubkey,
    /// Minimum lamports per entry; at least the rent-exempt minimum of an empty account
    pub entrance_fee: u64,
    /// Key hash selecting the coordinator's gas lane
    pub gas_lane: [u8; 32],
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    /// Seconds that must pass between draws
    pub interval: i64,
    /// Time the raffle opened or last picked a winner
    pub last_timestamp: UnixTimestamp,
    pub state: RaffleState,
    /// Zero until the first draw
    pub recent_winner: Pubkey,
    /// Request id of the draw in flight (0 when open)
    pub pending_request_id: u64,
    pub players: Vec<Pubkey>,
}

/// Outcome of an upkeep check, with each condition broken out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpkeepStatus {
    pub upkeep_needed: bool,
    pub is_open: bool,
    pub time_passed: bool,
    pub has_players: bool,
    pub has_balance: bool,
}

impl UpkeepStatus {
    /// Return-data encoding of the check
    pub fn to_bytes(&self) -> [u8; 5] {
        [
            self.upkeep_needed as u8,
            self.is_open as u8,
            self.time_passed as u8,
            self.has_players as u8,
            self.has_balance as u8,
        ]
    }
}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Raffle {
    pub const LEN: usize = 1 // is_initialized
        + 1 // bump
        + 32 // authority
        + 32 // vrf_coordinator
        + 8 // entrance_fee
        + 32 // gas_lane
        + 8 // subscription_id
        + 4 // callback_gas_limit
        + 8 // interval
        + 8 // last_timestamp
        + 1 // state
        + 32 // recent_winner
        + 8 // pending_request_id
        + 4 + 32 * MAX_PLAYERS; // players

    /// Decode raffle data; trailing space in the account is ignored
    pub fn try_from_account_data(data: &[u8]) -> Result<Self, ProgramError> {
        let raffle = Self::deserialize(&mut &data[..])
            .map_err(|_| ProgramError::InvalidAccountData)?;
        if !raffle.is_initialized {
            return Err(ProgramError::UninitializedAccount);
        }
        Ok(raffle)
    }

    pub fn load(raffle_info: &AccountInfo) -> Result<Self, ProgramError> {
        Self::try_from_account_data(&raffle_info.data.borrow())
    }

    pub fn save(&self, raffle_info: &AccountInfo) -> ProgramResult {
        let mut data = raffle_info.data.borrow_mut();
        self.serialize(&mut &mut data[..])
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))
    }

    /// Evaluate whether a draw should start.
    ///
    /// `available_balance` is the lamports held above rent exemption.
    pub fn check_upkeep(&self, now: UnixTimestamp, available_balance: u64) -> UpkeepStatus {
        let is_open = self.state == RaffleState::Open;
        let time_passed = now.saturating_sub(self.last_timestamp) > self.interval;
        let has_players = !self.players.is_empty();
        let has_balance = available_balance > 0;

        UpkeepStatus {
            upkeep_needed: is_open && time_passed && has_players && has_balance,
            is_open,
            time_passed,
            has_players,
            has_balance,
        }
    }

    /// Index of the winning player for a random word
    pub fn winner_index(&self, random_word: u64) -> Option<usize> {
        if self.players.is_empty() {
            return None;
        }
        Some((random_word % self.players.len() as u64) as usize)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn raffle_state(&self) -> RaffleState {
        self.state
    }

    pub fn num_words(&self) -> u32 {
        NUM_WORDS
    }

    pub fn request_confirmations(&self) -> u16 {
        REQUEST_CONFIRMATIONS
    }

    pub fn number_of_players(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, index: usize) -> Option<&Pubkey> {
        self.players.get(index)
    }

    pub fn latest_timestamp(&self) -> UnixTimestamp {
        self.last_timestamp
    }

    pub fn interval(&self) -> i64 {
        self.interval
    }

    pub fn entrance_fee(&self) -> u64 {
        self.entrance_fee
    }

    pub fn recent_winner(&self) -> &Pubkey {
        &self.recent_winner
    }
}
