use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    msg,
    program_error::ProgramError,
    program_pack::{IsInitialized, Sealed},
    pubkey::Pubkey,
};

use crate::{
    config::{RaffleConfig, RequestConfig},
    custody::Custody,
    error::RaffleError,
    event::RaffleEvent,
    ledger::Ledger,
    settlement::pay_winner,
    state::RaffleState,
    tracker::{OutstandingRequest, RequestId, RequestTracker},
    upkeep::{check_upkeep, UpkeepCheck, UpkeepInputs},
    vrf::{RandomWord, RandomnessOracle},
};

/// Raffle account data and the round state machine that drives it.
///
/// Every mutating operation either completes or returns an error with the
/// raffle untouched. The pool itself lives in a [`Custody`] supplied per call.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    config: RaffleConfig,
    /// Only key allowed to sign fulfillments
    oracle: Pubkey,
    state: RaffleState,
    /// Start of the current round; moved forward by each settlement
    last_timestamp: UnixTimestamp,
    /// Winner of the previous round, zero before the first settlement
    recent_winner: Pubkey,
    tracker: RequestTracker,
    players: Ledger,
}

impl Sealed for Raffle {}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Raffle {
    /// Account size with room for a full ledger
    pub const LEN: usize =
        1 + RaffleConfig::LEN + 32 + 1 + 8 + 32 + RequestTracker::LEN + Ledger::MAX_LEN;

    pub fn new(
        config: RaffleConfig,
        oracle: Pubkey,
        now: UnixTimestamp,
    ) -> Result<Self, RaffleError> {
        config.validate()?;
        Ok(Self {
            is_initialized: true,
            config,
            oracle,
            state: RaffleState::Open,
            last_timestamp: now,
            recent_winner: Pubkey::default(),
            tracker: RequestTracker::default(),
            players: Ledger::default(),
        })
    }

    /// Decodes account data without checking initialization
    pub fn unpack_unchecked(src: &[u8]) -> Result<Self, ProgramError> {
        Self::deserialize(&mut &src[..]).map_err(|err| {
            msg!("Failed to decode raffle account: {}", err);
            ProgramError::InvalidAccountData
        })
    }

    pub fn unpack(src: &[u8]) -> Result<Self, ProgramError> {
        let raffle = Self::unpack_unchecked(src)?;
        if !raffle.is_initialized() {
            return Err(RaffleError::NotInitialized.into());
        }
        Ok(raffle)
    }

    pub fn pack(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        self.serialize(&mut &mut dst[..]).map_err(|err| {
            msg!("Failed to encode raffle account: {}", err);
            ProgramError::AccountDataTooSmall
        })
    }

    /// Adds `player` to the current round, moving `paid_amount` into custody.
    ///
    /// Anything paid above the entrance fee stays in the pool.
    pub fn enter<C: Custody>(
        &mut self,
        player: Pubkey,
        paid_amount: u64,
        custody: &mut C,
    ) -> Result<RaffleEvent, RaffleError> {
        if paid_amount < self.config.entrance_fee {
            msg!(
                "Paid {} lamports, entrance fee is {}",
                paid_amount,
                self.config.entrance_fee
            );
            return Err(RaffleError::InsufficientFee);
        }
        if self.state != RaffleState::Open {
            msg!("Raffle is {:?}, entries are closed", self.state);
            return Err(RaffleError::RaffleNotOpen);
        }
        if self.players.is_full() {
            msg!("Round already has {} entries", self.players.len());
            return Err(RaffleError::RaffleFull);
        }

        custody.credit(&player, paid_amount)?;
        self.players.push(player)?;
        Ok(RaffleEvent::Entered { player })
    }

    /// Upkeep gate over the current round; never mutates
    pub fn check_upkeep<C: Custody>(&self, now: UnixTimestamp, custody: &C) -> UpkeepCheck {
        check_upkeep(
            &UpkeepInputs {
                state: self.state,
                last_timestamp: self.last_timestamp,
                interval: self.config.interval,
                players: self.players.len(),
                pool_balance: custody.balance(),
            },
            now,
        )
    }

    /// Closes the round and requests randomness.
    ///
    /// The gate is evaluated again here; `perform_data` is caller-supplied and
    /// is not trusted or interpreted.
    pub fn perform_upkeep<C: Custody, O: RandomnessOracle>(
        &mut self,
        _perform_data: &[u8],
        now: UnixTimestamp,
        custody: &C,
        oracle: &mut O,
    ) -> Result<RaffleEvent, RaffleError> {
        let check = self.check_upkeep(now, custody);
        if !check.upkeep_needed {
            msg!(
                "Upkeep not needed: balance={}, players={}, state={:?}, time_passed={}",
                custody.balance(),
                self.players.len(),
                self.state,
                check.time_passed
            );
            return Err(RaffleError::UpkeepNotNeeded);
        }

        let request_id =
            oracle.request_randomness(&self.config.request_config, self.tracker.nonce())?;
        self.tracker.register(request_id, now)?;
        self.state = RaffleState::Calculating;
        Ok(RaffleEvent::RequestedRandomness { request_id })
    }

    /// Settles the round with the oracle's answer to the outstanding request.
    ///
    /// The payout happens before any field changes, so a failed payout leaves
    /// the raffle calculating with its ledger and request intact.
    pub fn fulfill<C: Custody>(
        &mut self,
        request_id: RequestId,
        random_word: &RandomWord,
        now: UnixTimestamp,
        custody: &mut C,
    ) -> Result<RaffleEvent, RaffleError> {
        if let Err(err) = self.tracker.matching(request_id) {
            msg!(
                "Fulfillment for request {} does not match outstanding {:?}",
                request_id,
                self.tracker.outstanding().map(|o| o.request_id)
            );
            return Err(err);
        }

        let payout = pay_winner(&self.players, random_word, custody)?;
        msg!(
            "Entry {} of {} won",
            payout.winner_index,
            self.players.len()
        );

        self.recent_winner = payout.winner;
        self.players.clear();
        self.tracker.clear();
        self.last_timestamp = now;
        self.state = RaffleState::Open;

        Ok(RaffleEvent::WinnerPicked {
            winner: payout.winner,
            amount: payout.amount,
            request_id,
        })
    }

    pub fn entrance_fee(&self) -> u64 {
        self.config.entrance_fee
    }

    pub fn interval(&self) -> u64 {
        self.config.interval
    }

    pub fn request_config(&self) -> &RequestConfig {
        &self.config.request_config
    }

    pub fn num_words(&self) -> u32 {
        self.config.request_config.num_words
    }

    pub fn request_confirmations(&self) -> u16 {
        self.config.request_config.request_confirmations
    }

    pub fn oracle(&self) -> &Pubkey {
        &self.oracle
    }

    pub fn raffle_state(&self) -> RaffleState {
        self.state
    }

    pub fn number_of_players(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, index: usize) -> Option<&Pubkey> {
        self.players.get(index)
    }

    pub fn players(&self) -> &Ledger {
        &self.players
    }

    pub fn latest_timestamp(&self) -> UnixTimestamp {
        self.last_timestamp
    }

    pub fn recent_winner(&self) -> &Pubkey {
        &self.recent_winner
    }

    pub fn outstanding_request(&self) -> Option<&OutstandingRequest> {
        self.tracker.outstanding()
    }
}
