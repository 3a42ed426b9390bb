use crate::raffle_error::RaffleError;
use crate::raffle_instruction::RaffleInstruction;
use crate::raffle_state::{Raffle, RaffleState, MAX_PLAYERS, NUM_WORDS, REQUEST_CONFIRMATIONS};
use crate::utils::{self, RAFFLE_SEED};
use crate::vrf::{self, RandomWordsRequest};

use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, set_return_data},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

/// Deployment arguments of a raffle, in constructor order
pub struct InitializeArgs {
    pub vrf_coordinator: Pubkey,
    pub entrance_fee: u64,
    pub gas_lane: [u8; 32],
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    pub interval: i64,
}

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)
            .map_err(|_| RaffleError::InvalidInstructionData)?;

        match instruction {
            RaffleInstruction::InitializeRaffle {
                vrf_coordinator,
                entrance_fee,
                gas_lane,
                subscription_id,
                callback_gas_limit,
                interval,
            } => {
                msg!("Instruction: Initialize Raffle");
                let args = InitializeArgs {
                    vrf_coordinator,
                    entrance_fee,
                    gas_lane,
                    subscription_id,
                    callback_gas_limit,
                    interval,
                };
                Self::process_initialize_raffle(accounts, args, program_id)
            }
            RaffleInstruction::EnterRaffle { amount } => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(accounts, amount, program_id)
            }
            RaffleInstruction::CheckUpkeep {} => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, program_id)
            }
            RaffleInstruction::PerformUpkeep {} => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, program_id)
            }
            RaffleInstruction::RawFulfillRandomWords { request_id, random_words } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(accounts, request_id, random_words, program_id)
            }
        }
    }

    fn process_initialize_raffle(
        accounts: &[AccountInfo],
        args: InitializeArgs,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let deployer_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !deployer_info.is_signer {
            msg!("Deployer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        // a pot of one entry must be able to fund a closed winner account
        let rent = Rent::get()?;
        let minimum_fee = rent.minimum_balance(0);
        if args.entrance_fee < minimum_fee {
            msg!("Entrance fee must be at least {} lamports", minimum_fee);
            return Err(ProgramError::InvalidArgument);
        }
        if args.interval < 0 {
            msg!("Interval cannot be negative");
            return Err(ProgramError::InvalidArgument);
        }

        let (expected_raffle, bump) = utils::find_raffle_address(program_id, deployer_info.key);
        if *raffle_info.key != expected_raffle {
            msg!("Invalid raffle account address");
            return Err(RaffleError::InvalidRaffleAccount.into());
        }

        if raffle_info.owner == program_id {
            if Raffle::load(raffle_info).is_ok() {
                msg!("Raffle account is already initialized");
                return Err(RaffleError::AlreadyInitialized.into());
            }
        } else {
            utils::create_pda_account(
                deployer_info,
                raffle_info,
                system_program_info,
                Raffle::LEN,
                program_id,
                &[RAFFLE_SEED, deployer_info.key.as_ref(), &[bump]],
                &rent,
            )?;
        }

        let clock = Clock::get()?;

        let raffle = Raffle {
            is_initialized: true,
            bump,
            authority: *deployer_info.key,
            vrf_coordinator: args.vrf_coordinator,
            entrance_fee: args.entrance_fee,
            gas_lane: args.gas_lane,
            subscription_id: args.subscription_id,
            callback_gas_limit: args.callback_gas_limit,
            interval: args.interval,
            last_timestamp: clock.unix_timestamp,
            state: RaffleState::Open,
            recent_winner: Pubkey::default(),
            pending_request_id: 0,
            players: Vec::with_capacity(MAX_PLAYERS),
        };
        raffle.save(raffle_info)?;

        msg!(
            "Raffle initialized: Coordinator={}, EntranceFee={}, Subscription={}, Interval={}s",
            args.vrf_coordinator,
            args.entrance_fee,
            args.subscription_id,
            args.interval
        );
        Ok(())
    }

    fn process_enter_raffle(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::load(raffle_info)?;

        if amount < raffle.entrance_fee {
            msg!("Entry of {} lamports is below the entrance fee of {}", amount, raffle.entrance_fee);
            return Err(RaffleError::NotEnoughLamportsEntered.into());
        }
        if raffle.state != RaffleState::Open {
            msg!("Raffle is calculating a winner");
            return Err(RaffleError::RaffleNotOpen.into());
        }
        if raffle.is_full() {
            msg!("Raffle already holds {} players", MAX_PLAYERS);
            return Err(RaffleError::RaffleFull.into());
        }

        invoke(
            &system_instruction::transfer(player_info.key, raffle_info.key, amount),
            &[
                player_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.players.push(*player_info.key);
        raffle.save(raffle_info)?;

        msg!(
            "RaffleEnter: player={}, amount={} SOL",
            player_info.key,
            utils::lamports_to_sol(amount)
        );
        Ok(())
    }

    fn process_check_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        if raffle_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let raffle = Raffle::load(raffle_info)?;
        let clock = Clock::get()?;
        let rent = Rent::get()?;
        let balance = utils::available_balance(raffle_info.lamports(), &rent, raffle_info.data_len());

        let status = raffle.check_upkeep(clock.unix_timestamp, balance);
        set_return_data(&status.to_bytes());

        msg!("Upkeep needed: {}", status.upkeep_needed);
        Ok(())
    }

    fn process_perform_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_program_info = next_account_info(account_info_iter)?;
        let coordinator_config_info = next_account_info(account_info_iter)?;
        let subscription_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !caller_info.is_signer {
            msg!("Caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::load(raffle_info)?;
        let clock = Clock::get()?;
        let rent = Rent::get()?;
        let balance = utils::available_balance(raffle_info.lamports(), &rent, raffle_info.data_len());

        let status = raffle.check_upkeep(clock.unix_timestamp, balance);
        if !status.upkeep_needed {
            msg!(
                "UpkeepNotNeeded: balance={}, players={}, state={}",
                balance,
                raffle.players.len(),
                u8::from(raffle.state)
            );
            return Err(RaffleError::UpkeepNotNeeded.into());
        }

        if *coordinator_program_info.key != raffle.vrf_coordinator {
            msg!("Coordinator {} does not match {}", coordinator_program_info.key, raffle.vrf_coordinator);
            return Err(RaffleError::InvalidCoordinator.into());
        }

        let request = RandomWordsRequest {
            key_hash: raffle.gas_lane,
            subscription_id: raffle.subscription_id,
            request_confirmations: REQUEST_CONFIRMATIONS,
            callback_gas_limit: raffle.callback_gas_limit,
            num_words: NUM_WORDS,
        };
        let request_id = vrf::request_random_words(
            coordinator_program_info,
            coordinator_config_info,
            subscription_info,
            request_info,
            raffle_info,
            caller_info,
            system_program_info,
            &request,
            &[RAFFLE_SEED, raffle.authority.as_ref(), &[raffle.bump]],
        )?;

        raffle.state = RaffleState::Calculating;
        raffle.pending_request_id = request_id;
        raffle.save(raffle_info)?;

        msg!("RequestedRaffleWinner: request_id={}", request_id);
        Ok(())
    }

    fn process_fulfill_random_words(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: Vec<u64>,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let candidate_infos: Vec<&AccountInfo> = account_info_iter.collect();

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::load(raffle_info)?;

        if !vrf::is_coordinator_authority(authority_info, &raffle.vrf_coordinator) {
            msg!("{} is not the authority of coordinator {}", authority_info.key, raffle.vrf_coordinator);
            return Err(RaffleError::OnlyCoordinatorCanFulfill.into());
        }

        if raffle.state != RaffleState::Calculating || raffle.pending_request_id != request_id {
            msg!("Request {} is not the pending request {}", request_id, raffle.pending_request_id);
            return Err(RaffleError::UnexpectedRequest.into());
        }

        let random_word = *random_words.first().ok_or(RaffleError::NoRandomWords)?;
        let index_of_winner = raffle.winner_index(random_word).ok_or(RaffleError::NoPlayers)?;
        let winner = raffle.players[index_of_winner];
        msg!("Random word {} selects player {} of {}", random_word, index_of_winner, raffle.players.len());

        let winner_info = candidate_infos
            .iter()
            .find(|info| *info.key == winner)
            .ok_or(RaffleError::WinnerAccountMissing)?;
        if !winner_info.is_writable {
            msg!("Winner account {} must be writable", winner);
            return Err(RaffleError::TransferFailed.into());
        }

        let rent = Rent::get()?;
        let prize = utils::available_balance(raffle_info.lamports(), &rent, raffle_info.data_len());

        let clock = Clock::get()?;
        raffle.players.clear();
        raffle.state = RaffleState::Open;
        raffle.last_timestamp = clock.unix_timestamp;
        raffle.recent_winner = winner;
        raffle.pending_request_id = 0;
        raffle.save(raffle_info)?;

        let raffle_lamports = raffle_info
            .lamports()
            .checked_sub(prize)
            .ok_or(RaffleError::TransferFailed)?;
        let winner_lamports = winner_info
            .lamports()
            .checked_add(prize)
            .ok_or(RaffleError::TransferFailed)?;
        **raffle_info.try_borrow_mut_lamports()? = raffle_lamports;
        **winner_info.try_borrow_mut_lamports()? = winner_lamports;

        msg!("WinnerPicked: {} won {} lamports", winner, prize);
        Ok(())
    }
}
