use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{log::sol_log_data, msg, pubkey::Pubkey};

use crate::tracker::RequestId;

/// Notifications for indexers and the upkeep trigger
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum RaffleEvent {
    Entered {
        player: Pubkey,
    },
    RequestedRandomness {
        request_id: RequestId,
    },
    WinnerPicked {
        winner: Pubkey,
        amount: u64,
        request_id: RequestId,
    },
}

impl RaffleEvent {
    /// Writes a readable line and a borsh-encoded data record to the program log
    pub fn emit(&self) {
        match self {
            RaffleEvent::Entered { player } => msg!("Entered: {}", player),
            RaffleEvent::RequestedRandomness { request_id } => {
                msg!("RequestedRandomness: {}", request_id)
            }
            RaffleEvent::WinnerPicked {
                winner,
                amount,
                request_id,
            } => msg!(
                "WinnerPicked: {} won {} lamports (request {})",
                winner,
                amount,
                request_id
            ),
        }
        match borsh::to_vec(self) {
            Ok(data) => sol_log_data(&[&data]),
            Err(err) => msg!("Failed to encode event: {}", err),
        }
    }
}
