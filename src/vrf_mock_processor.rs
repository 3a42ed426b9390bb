// VRF Coordinator Mock - Instruction Processor
//
// A local stand-in for a verifiable randomness service: subscriptions are
// funded without a token and requests are answered on demand.
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    instruction::{AccountMeta, Instruction},
    msg,
    program::{invoke_signed, set_return_data},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    sysvar::{rent::Rent, Sysvar},
};

use crate::{
    utils,
    vrf::{self, AUTHORITY_SEED, CONFIG_SEED, REQUEST_SEED, SUBSCRIPTION_SEED},
    vrf_mock_error::VrfMockError,
    vrf_mock_instruction::VrfCoordinatorInstruction,
    vrf_mock_state::{
        CoordinatorConfig, RandomnessRequest, Subscription, MAX_NUM_WORDS,
        MAX_REQUEST_CONFIRMATIONS,
    },
};

/// Program state handler.
pub struct VrfMockProcessor {}

impl VrfMockProcessor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = VrfCoordinatorInstruction::unpack(instruction_data)?;

        match instruction {
            VrfCoordinatorInstruction::InitializeCoordinator { base_fee, gas_price_link } => {
                msg!("Instruction: Initialize Coordinator");
                Self::process_initialize_coordinator(program_id, accounts, base_fee, gas_price_link)
            }
            VrfCoordinatorInstruction::CreateSubscription => {
                msg!("Instruction: Create Subscription");
                Self::process_create_subscription(program_id, accounts)
            }
            VrfCoordinatorInstruction::FundSubscription { subscription_id, amount } => {
                msg!("Instruction: Fund Subscription");
                Self::process_fund_subscription(program_id, accounts, subscription_id, amount)
            }
            VrfCoordinatorInstruction::AddConsumer { subscription_id, consumer } => {
                msg!("Instruction: Add Consumer");
                Self::process_add_consumer(program_id, accounts, subscription_id, consumer)
            }
            VrfCoordinatorInstruction::RemoveConsumer { subscription_id, consumer } => {
                msg!("Instruction: Remove Consumer");
                Self::process_remove_consumer(program_id, accounts, subscription_id, consumer)
            }
            VrfCoordinatorInstruction::RequestRandomWords {
                key_hash,
                subscription_id,
                request_confirmations,
                callback_gas_limit,
                num_words,
            } => {
                msg!("Instruction: Request Random Words");
                let request = vrf::RandomWordsRequest {
                    key_hash,
                    subscription_id,
                    request_confirmations,
                    callback_gas_limit,
                    num_words,
                };
                Self::process_request_random_words(program_id, accounts, &request)
            }
            VrfCoordinatorInstruction::FulfillRandomWords { request_id, words } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(program_id, accounts, request_id, words)
            }
        }
    }

    fn process_initialize_coordinator(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        base_fee: u64,
        gas_price_link: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !admin_info.is_signer {
            msg!("Admin must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let (expected_config, bump) = vrf::find_config_address(program_id);
        if *config_info.key != expected_config {
            msg!("Invalid config account address");
            return Err(VrfMockError::InvalidAccount.into());
        }

        if config_info.owner == program_id {
            msg!("Coordinator config already exists");
            return Err(VrfMockError::AlreadyInitialized.into());
        }

        let rent = Rent::get()?;
        utils::create_pda_account(
            admin_info,
            config_info,
            system_program_info,
            CoordinatorConfig::LEN,
            program_id,
            &[CONFIG_SEED, &[bump]],
            &rent,
        )?;

        let config = CoordinatorConfig {
            is_initialized: true,
            admin: *admin_info.key,
            base_fee,
            gas_price_link,
            current_subscription_id: 0,
            request_counter: 0,
        };
        CoordinatorConfig::pack(config, &mut config_info.data.borrow_mut())?;

        msg!("Coordinator deployed: BaseFee={}, GasPriceLink={}", base_fee, gas_price_link);
        Ok(())
    }

    fn process_create_subscription(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let subscription_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !owner_info.is_signer {
            msg!("Subscription owner must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut config = Self::load_config(program_id, config_info)?;
        let subscription_id = config
            .current_subscription_id
            .checked_add(1)
            .ok_or(VrfMockError::Overflow)?;

        let (expected_subscription, bump) = vrf::find_subscription_address(program_id, subscription_id);
        if *subscription_info.key != expected_subscription {
            msg!("Subscription account does not match next id {}", subscription_id);
            return Err(VrfMockError::InvalidAccount.into());
        }

        let rent = Rent::get()?;
        utils::create_pda_account(
            owner_info,
            subscription_info,
            system_program_info,
            Subscription::LEN,
            program_id,
            &[SUBSCRIPTION_SEED, &subscription_id.to_le_bytes(), &[bump]],
            &rent,
        )?;

        Subscription::pack(
            Subscription::new(subscription_id, *owner_info.key),
            &mut subscription_info.data.borrow_mut(),
        )?;

        config.current_subscription_id = subscription_id;
        CoordinatorConfig::pack(config, &mut config_info.data.borrow_mut())?;

        set_return_data(&subscription_id.to_le_bytes());
        msg!("SubscriptionCreated: id={}, owner={}", subscription_id, owner_info.key);
        Ok(())
    }

    fn process_fund_subscription(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        subscription_id: u64,
        amount: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let funder_info = next_account_info(account_info_iter)?;
        let subscription_info = next_account_info(account_info_iter)?;

        if !funder_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut subscription = Self::load_subscription(program_id, subscription_info, subscription_id)?;
        let old_balance = subscription.balance;
        subscription.balance = old_balance
            .checked_add(amount)
            .ok_or(VrfMockError::Overflow)?;
        Subscription::pack(subscription, &mut subscription_info.data.borrow_mut())?;

        msg!(
            "SubscriptionFunded: id={}, old_balance={}, new_balance={}",
            subscription_id,
            old_balance,
            subscription.balance
        );
        Ok(())
    }

    fn process_add_consumer(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        subscription_id: u64,
        consumer: Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let subscription_info = next_account_info(account_info_iter)?;

        let mut subscription = Self::load_subscription(program_id, subscription_info, subscription_id)?;
        Self::check_owner(&subscription, owner_info)?;

        subscription.add_consumer(consumer)?;
        Subscription::pack(subscription, &mut subscription_info.data.borrow_mut())?;

        msg!("ConsumerAdded: subscription={}, consumer={}", subscription_id, consumer);
        Ok(())
    }

    fn process_remove_consumer(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        subscription_id: u64,
        consumer: Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let subscription_info = next_account_info(account_info_iter)?;

        let mut subscription = Self::load_subscription(program_id, subscription_info, subscription_id)?;
        Self::check_owner(&subscription, owner_info)?;

        subscription.remove_consumer(&consumer)?;
        Subscription::pack(subscription, &mut subscription_info.data.borrow_mut())?;

        msg!("ConsumerRemoved: subscription={}, consumer={}", subscription_id, consumer);
        Ok(())
    }

    fn process_request_random_words(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request: &vrf::RandomWordsRequest,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let config_info = next_account_info(account_info_iter)?;
        let subscription_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;
        let consumer_info = next_account_info(account_info_iter)?;
        let payer_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            msg!("Payer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut config = Self::load_config(program_id, config_info)?;
        let mut subscription =
            Self::load_subscription(program_id, subscription_info, request.subscription_id)?;

        if !consumer_info.is_signer || !subscription.is_consumer(consumer_info.key) {
            msg!("Consumer {} is not registered on subscription {}", consumer_info.key, subscription.id);
            return Err(VrfMockError::InvalidConsumer.into());
        }
        if request.request_confirmations > MAX_REQUEST_CONFIRMATIONS {
            msg!("Request confirmations {} exceed {}", request.request_confirmations, MAX_REQUEST_CONFIRMATIONS);
            return Err(VrfMockError::InvalidRequestConfirmations.into());
        }
        if request.num_words > MAX_NUM_WORDS {
            msg!("Requested {} words, at most {} allowed", request.num_words, MAX_NUM_WORDS);
            return Err(VrfMockError::NumWordsTooBig.into());
        }

        let request_id = config
            .request_counter
            .checked_add(1)
            .ok_or(VrfMockError::Overflow)?;
        let (expected_request, bump) = vrf::find_request_address(program_id, request_id);
        if *request_info.key != expected_request {
            msg!("Request account does not match next request id {}", request_id);
            return Err(VrfMockError::InvalidAccount.into());
        }

        let rent = Rent::get()?;
        utils::create_pda_account(
            payer_info,
            request_info,
            system_program_info,
            RandomnessRequest::LEN,
            program_id,
            &[REQUEST_SEED, &request_id.to_le_bytes(), &[bump]],
            &rent,
        )?;

        let randomness_request = RandomnessRequest {
            is_initialized: true,
            id: request_id,
            subscription_id: subscription.id,
            consumer: *consumer_info.key,
            consumer_program: *consumer_info.owner,
            key_hash: request.key_hash,
            request_confirmations: request.request_confirmations,
            callback_gas_limit: request.callback_gas_limit,
            num_words: request.num_words,
        };
        RandomnessRequest::pack(randomness_request, &mut request_info.data.borrow_mut())?;

        config.request_counter = request_id;
        CoordinatorConfig::pack(config, &mut config_info.data.borrow_mut())?;

        subscription.request_count = subscription
            .request_count
            .checked_add(1)
            .ok_or(VrfMockError::Overflow)?;
        Subscription::pack(subscription, &mut subscription_info.data.borrow_mut())?;

        set_return_data(&request_id.to_le_bytes());
        msg!(
            "RandomWordsRequested: request_id={}, subscription={}, consumer={}, num_words={}",
            request_id,
            subscription.id,
            consumer_info.key,
            request.num_words
        );
        Ok(())
    }

    fn process_fulfill_random_words(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: u64,
        words: Vec<u64>,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let fulfiller_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let subscription_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;
        let authority_info = next_account_info(account_info_iter)?;
        let consumer_program_info = next_account_info(account_info_iter)?;
        let consumer_info = next_account_info(account_info_iter)?;
        let callback_infos: Vec<AccountInfo> = account_info_iter.cloned().collect();

        if !fulfiller_info.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }

        let config = Self::load_config(program_id, config_info)?;
        let request = Self::load_request(program_id, request_info, request_id)?;

        let words = if words.is_empty() {
            vrf::derive_random_words(request_id, request.num_words)
        } else if words.len() != request.num_words as usize {
            msg!("Got {} words, request {} wants {}", words.len(), request_id, request.num_words);
            return Err(VrfMockError::InvalidRandomWords.into());
        } else {
            words
        };

        if *consumer_info.key != request.consumer
            || *consumer_program_info.key != request.consumer_program
        {
            msg!("Consumer accounts do not match request {}", request_id);
            return Err(VrfMockError::InvalidConsumer.into());
        }

        let (expected_authority, authority_bump) = vrf::find_authority_address(program_id);
        if *authority_info.key != expected_authority {
            msg!("Invalid coordinator authority account");
            return Err(VrfMockError::InvalidAccount.into());
        }

        let mut subscription =
            Self::load_subscription(program_id, subscription_info, request.subscription_id)?;
        let payment = config.fulfillment_payment(request.callback_gas_limit)?;
        if subscription.balance < payment {
            msg!("Subscription {} holds {}, fulfillment costs {}", subscription.id, subscription.balance, payment);
            return Err(VrfMockError::InsufficientBalance.into());
        }
        subscription.balance -= payment;
        Subscription::pack(subscription, &mut subscription_info.data.borrow_mut())?;

        // Close the request so it cannot be answered twice
        let request_lamports = request_info.lamports();
        **request_info.try_borrow_mut_lamports()? = 0;
        **fulfiller_info.try_borrow_mut_lamports()? = fulfiller_info
            .lamports()
            .checked_add(request_lamports)
            .ok_or(VrfMockError::Overflow)?;
        request_info.data.borrow_mut().fill(0);

        let mut callback_accounts = vec![
            AccountMeta::new_readonly(*authority_info.key, true),
            AccountMeta::new(*consumer_info.key, false),
        ];
        callback_accounts.extend(callback_infos.iter().map(|info| {
            if info.is_writable {
                AccountMeta::new(*info.key, false)
            } else {
                AccountMeta::new_readonly(*info.key, false)
            }
        }));

        let callback = Instruction {
            program_id: request.consumer_program,
            accounts: callback_accounts,
            data: vrf::pack_fulfill_random_words(request_id, &words),
        };

        let mut account_infos = vec![
            authority_info.clone(),
            consumer_info.clone(),
            consumer_program_info.clone(),
        ];
        account_infos.extend(callback_infos);

        invoke_signed(&callback, &account_infos, &[&[AUTHORITY_SEED, &[authority_bump]]])?;

        msg!("RandomWordsFulfilled: request_id={}, payment={}", request_id, payment);
        Ok(())
    }

    fn load_config(program_id: &Pubkey, config_info: &AccountInfo) -> Result<CoordinatorConfig, ProgramError> {
        let (expected_config, _) = vrf::find_config_address(program_id);
        if *config_info.key != expected_config || config_info.owner != program_id {
            msg!("Coordinator config account is missing");
            return Err(VrfMockError::NotInitialized.into());
        }
        CoordinatorConfig::unpack(&config_info.data.borrow())
            .map_err(|_| VrfMockError::NotInitialized.into())
    }

    fn load_subscription(
        program_id: &Pubkey,
        subscription_info: &AccountInfo,
        subscription_id: u64,
    ) -> Result<Subscription, ProgramError> {
        let (expected_subscription, _) = vrf::find_subscription_address(program_id, subscription_id);
        if *subscription_info.key != expected_subscription || subscription_info.owner != program_id {
            msg!("Subscription {} does not exist", subscription_id);
            return Err(VrfMockError::InvalidSubscription.into());
        }
        Subscription::unpack(&subscription_info.data.borrow())
            .map_err(|_| VrfMockError::InvalidSubscription.into())
    }

    fn load_request(
        program_id: &Pubkey,
        request_info: &AccountInfo,
        request_id: u64,
    ) -> Result<RandomnessRequest, ProgramError> {
        let (expected_request, _) = vrf::find_request_address(program_id, request_id);
        if *request_info.key != expected_request || request_info.owner != program_id {
            msg!("Request {} does not exist", request_id);
            return Err(VrfMockError::NonexistentRequest.into());
        }
        RandomnessRequest::unpack(&request_info.data.borrow())
            .map_err(|_| VrfMockError::NonexistentRequest.into())
    }

    fn check_owner(subscription: &Subscription, owner_info: &AccountInfo) -> ProgramResult {
        if !owner_info.is_signer || subscription.owner != *owner_info.key {
            msg!("Only {} may manage subscription {}", subscription.owner, subscription.id);
            return Err(VrfMockError::MustBeSubOwner.into());
        }
        Ok(())
    }
}
