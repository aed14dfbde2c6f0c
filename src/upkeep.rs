use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::clock::UnixTimestamp;

use crate::state::RaffleState;

/// Outcome of the upkeep gate, with every condition it evaluated
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UpkeepCheck {
    pub upkeep_needed: bool,
    pub is_open: bool,
    pub time_passed: bool,
    pub has_players: bool,
    pub has_balance: bool,
    /// Opaque data handed to `perform_upkeep`; always empty
    pub perform_data: Vec<u8>,
}

/// Inputs to the gate, snapshotted from the raffle and its custody
#[derive(Clone, Copy, Debug)]
pub struct UpkeepInputs {
    pub state: RaffleState,
    pub last_timestamp: UnixTimestamp,
    pub interval: u64,
    pub players: usize,
    pub pool_balance: u64,
}

/// Seconds elapsed since `last`; a clock behind `last` counts as zero
pub fn elapsed(now: UnixTimestamp, last: UnixTimestamp) -> u64 {
    u64::try_from(now.saturating_sub(last)).unwrap_or(0)
}

/// Decides whether the current round may be settled
pub fn check_upkeep(inputs: &UpkeepInputs, now: UnixTimestamp) -> UpkeepCheck {
    let is_open = inputs.state == RaffleState::Open;
    let time_passed = elapsed(now, inputs.last_timestamp) > inputs.interval;
    let has_players = inputs.players > 0;
    let has_balance = inputs.pool_balance > 0;

    UpkeepCheck {
        upkeep_needed: is_open && time_passed && has_players && has_balance,
        is_open,
        time_passed,
        has_players,
        has_balance,
        perform_data: Vec::new(),
    }
}
