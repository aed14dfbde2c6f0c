use crate::{
    config::{RaffleConfig, RequestConfig},
    custody::AccountCustody,
    error::RaffleError,
    instruction::RaffleInstruction,
    raffle::Raffle,
    tracker::RequestId,
    utils,
    vrf::{LogOracle, RandomWord},
};

use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::Initialize {
                entrance_fee,
                interval,
                request_config,
            } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(
                    program_id,
                    accounts,
                    entrance_fee,
                    interval,
                    request_config,
                )
            }
            RaffleInstruction::Enter { amount } => {
                msg!("Instruction: Enter");
                Self::process_enter(program_id, accounts, amount)
            }
            RaffleInstruction::CheckUpkeep { .. } => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(program_id, accounts)
            }
            RaffleInstruction::PerformUpkeep { perform_data } => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(program_id, accounts, &perform_data)
            }
            RaffleInstruction::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(
                    program_id,
                    accounts,
                    request_id,
                    &random_words,
                )
            }
        }
    }

    /// Process the Initialize instruction
    ///
    /// Creates the raffle PDA sized for a full round and opens the first round
    /// at the current clock time. Only ever succeeds once per program.
    fn process_initialize(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: u64,
        request_config: RequestConfig,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let oracle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            msg!("Payer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let (expected_raffle, bump_seed) = utils::find_raffle_address(program_id);
        if *raffle_info.key != expected_raffle {
            msg!("Invalid raffle account address");
            return Err(RaffleError::InvalidRaffleAccount.into());
        }

        let config = RaffleConfig::new(entrance_fee, interval, request_config).map_err(|err| {
            msg!(
                "Rejected configuration: fee={}, interval={}, words={}",
                entrance_fee,
                interval,
                request_config.num_words
            );
            err
        })?;

        if raffle_info.owner == program_id {
            if Raffle::unpack_unchecked(&raffle_info.data.borrow())?.is_initialized() {
                msg!("Raffle account is already initialized");
                return Err(ProgramError::AccountAlreadyInitialized);
            }
        } else if raffle_info.lamports() > 0 {
            // Someone sent lamports to the address first; create_account would refuse it
            msg!("Raffle address already funded, allocating in place");
            Self::allocate_funded_raffle(
                program_id,
                payer_info,
                raffle_info,
                system_program_info,
                bump_seed,
            )?;
        } else {
            msg!("Creating raffle account");
            let rent_lamports = Rent::get()?.minimum_balance(Raffle::LEN);
            invoke_signed(
                &system_instruction::create_account(
                    payer_info.key,
                    raffle_info.key,
                    rent_lamports,
                    Raffle::LEN as u64,
                    program_id,
                ),
                &[
                    payer_info.clone(),
                    raffle_info.clone(),
                    system_program_info.clone(),
                ],
                &[&[utils::RAFFLE_SEED, &[bump_seed]]],
            )?;
        }

        let clock = Clock::get()?;
        let raffle = Raffle::new(config, *oracle_info.key, clock.unix_timestamp)?;
        raffle.pack(&mut raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: EntranceFee={} SOL, Interval={}s, Oracle={}",
            utils::lamports_to_sol(entrance_fee),
            interval,
            oracle_info.key
        );
        Ok(())
    }

    /// Tops the funded address up to rent exemption, then sizes it and hands it
    /// to the program
    fn allocate_funded_raffle<'a>(
        program_id: &Pubkey,
        payer_info: &AccountInfo<'a>,
        raffle_info: &AccountInfo<'a>,
        system_program_info: &AccountInfo<'a>,
        bump_seed: u8,
    ) -> ProgramResult {
        let rent_lamports = Rent::get()?.minimum_balance(Raffle::LEN);
        let missing = rent_lamports.saturating_sub(raffle_info.lamports());
        if missing > 0 {
            invoke(
                &system_instruction::transfer(payer_info.key, raffle_info.key, missing),
                &[
                    payer_info.clone(),
                    raffle_info.clone(),
                    system_program_info.clone(),
                ],
            )?;
        }

        let bump = [bump_seed];
        let signer_seeds: &[&[u8]] = &[utils::RAFFLE_SEED, &bump];
        invoke_signed(
            &system_instruction::allocate(raffle_info.key, Raffle::LEN as u64),
            &[raffle_info.clone(), system_program_info.clone()],
            &[signer_seeds],
        )?;
        invoke_signed(
            &system_instruction::assign(raffle_info.key, program_id),
            &[raffle_info.clone(), system_program_info.clone()],
            &[signer_seeds],
        )?;
        Ok(())
    }

    fn process_enter(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(program_id, raffle_info)?;
        let mut custody = AccountCustody::new(raffle_info, Self::rent_reserve(raffle_info)?)
            .with_depositor(player_info, system_program_info);

        let event = raffle.enter(*player_info.key, amount, &mut custody)?;
        raffle.pack(&mut raffle_info.data.borrow_mut())?;
        event.emit();

        msg!(
            "Round now has {} entries, pool {} lamports",
            raffle.number_of_players(),
            raffle_info.lamports().saturating_sub(Self::rent_reserve(raffle_info)?)
        );
        Ok(())
    }

    /// Read-only; the borsh-encoded upkeep result is returned as return data
    fn process_check_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        let raffle = Self::load_raffle(program_id, raffle_info)?;
        let custody = AccountCustody::new(raffle_info, Self::rent_reserve(raffle_info)?);
        let clock = Clock::get()?;

        let check = raffle.check_upkeep(clock.unix_timestamp, &custody);
        msg!(
            "Upkeep needed={} (open={}, time_passed={}, players={}, balance={})",
            check.upkeep_needed,
            check.is_open,
            check.time_passed,
            check.has_players,
            check.has_balance
        );

        let data = borsh::to_vec(&check)
            .map_err(|_| ProgramError::BorshIoError("upkeep".to_string()))?;
        set_return_data(&data);
        Ok(())
    }

    fn process_perform_upkeep(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        perform_data: &[u8],
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        if !caller_info.is_signer {
            msg!("Caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(program_id, raffle_info)?;
        let custody = AccountCustody::new(raffle_info, Self::rent_reserve(raffle_info)?);
        let clock = Clock::get()?;
        let mut oracle = LogOracle::new(*raffle_info.key, clock.slot);

        let event =
            raffle.perform_upkeep(perform_data, clock.unix_timestamp, &custody, &mut oracle)?;
        raffle.pack(&mut raffle_info.data.borrow_mut())?;
        event.emit();
        Ok(())
    }

    fn process_fulfill_random_words(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: RequestId,
        random_words: &[RandomWord],
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        let mut raffle = Self::load_raffle(program_id, raffle_info)?;

        if !oracle_info.is_signer || oracle_info.key != raffle.oracle() {
            msg!("Fulfillment must be signed by oracle {}", raffle.oracle());
            return Err(RaffleError::OnlyOracleCanFulfill.into());
        }

        let random_word = random_words.first().ok_or_else(|| {
            msg!("Fulfillment carries no random words");
            RaffleError::InvalidInstruction
        })?;

        let clock = Clock::get()?;
        let mut custody = AccountCustody::new(raffle_info, Self::rent_reserve(raffle_info)?)
            .with_recipient(winner_info);

        let event = raffle.fulfill(request_id, random_word, clock.unix_timestamp, &mut custody)?;
        raffle.pack(&mut raffle_info.data.borrow_mut())?;
        event.emit();
        Ok(())
    }

    /// Checks the raffle account address and owner, then decodes it
    fn load_raffle(program_id: &Pubkey, raffle_info: &AccountInfo) -> Result<Raffle, ProgramError> {
        let (expected_raffle, _) = utils::find_raffle_address(program_id);
        if *raffle_info.key != expected_raffle {
            msg!("Invalid raffle account address");
            return Err(RaffleError::InvalidRaffleAccount.into());
        }
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let raffle = Raffle::unpack(&raffle_info.data.borrow())?;
        Ok(raffle)
    }

    /// Lamports the raffle account must keep to stay rent exempt
    fn rent_reserve(raffle_info: &AccountInfo) -> Result<u64, ProgramError> {
        Ok(Rent::get()?.minimum_balance(raffle_info.data_len()))
    }
}
