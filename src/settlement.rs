//! Winner selection and payout.
//!
//! The winner index is `word mod players`. Because the 256-bit word range is not
//! a multiple of the player count, lower indices are favoured by at most
//! `players / 2^256`. The bias is negligible for any realistic round and is kept
//! as is; exact uniformity would need rejection sampling, which would change
//! which entry wins for a given word.

use solana_program::pubkey::Pubkey;

use crate::{
    custody::Custody,
    error::RaffleError,
    ledger::Ledger,
    vrf::{reduce_word, RandomWord},
};

/// Result of a successful payout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payout {
    pub winner_index: usize,
    pub winner: Pubkey,
    pub amount: u64,
}

/// Index of the winning entry, `None` for an empty round
pub fn winner_index(word: &RandomWord, players: usize) -> Option<usize> {
    reduce_word(word, players as u64).map(|index| index as usize)
}

/// Picks the winner from `ledger` and pays it the whole pool.
///
/// Touches nothing but custody, and custody moves nothing on failure, so an
/// error here leaves the round exactly as it was.
pub fn pay_winner<C: Custody>(
    ledger: &Ledger,
    word: &RandomWord,
    custody: &mut C,
) -> Result<Payout, RaffleError> {
    let winner_index = winner_index(word, ledger.len()).ok_or(RaffleError::PayoutFailed)?;
    let winner = *ledger.get(winner_index).ok_or(RaffleError::PayoutFailed)?;
    let amount = custody.debit_all(&winner)?;
    Ok(Payout {
        winner_index,
        winner,
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testing::MemoryCustody, vrf::word_from_u64};

    #[test]
    fn empty_round_has_no_winner() {
        assert_eq!(winner_index(&word_from_u64(5), 0), None);
        let mut custody = MemoryCustody::with_balance(10);
        assert_eq!(
            pay_winner(&Ledger::default(), &word_from_u64(5), &mut custody),
            Err(RaffleError::PayoutFailed)
        );
        assert_eq!(custody.balance(), 10);
    }

    #[test]
    fn every_index_is_reachable() {
        let mut ledger = Ledger::default();
        let players: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        for player in &players {
            ledger.push(*player).unwrap();
        }

        for value in 0..8u64 {
            let mut custody = MemoryCustody::with_balance(4);
            let payout = pay_winner(&ledger, &word_from_u64(value), &mut custody).unwrap();
            assert_eq!(payout.winner_index, (value % 4) as usize);
            assert_eq!(payout.winner, players[(value % 4) as usize]);
            assert_eq!(payout.amount, 4);
            assert_eq!(custody.paid_to(&payout.winner), 4);
        }
    }
}
