use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::error::RaffleError;

/// Entries one round can hold; bounded by the raffle account size
pub const MAX_PLAYERS: usize = 250;

/// Participants of the current round in entry order.
///
/// The same key may appear several times; each entry is one chance to win.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    players: Vec<Pubkey>,
}

impl Ledger {
    /// Encoded size of a full ledger
    pub const MAX_LEN: usize = 4 + 32 * MAX_PLAYERS;

    pub fn push(&mut self, player: Pubkey) -> Result<(), RaffleError> {
        if self.is_full() {
            return Err(RaffleError::RaffleFull);
        }
        self.players.push(player);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Pubkey> {
        self.players.get(index)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pubkey> {
        self.players.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let mut ledger = Ledger::default();
        ledger.push(alice).unwrap();
        ledger.push(bob).unwrap();
        ledger.push(alice).unwrap();

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.get(0), Some(&alice));
        assert_eq!(ledger.get(1), Some(&bob));
        assert_eq!(ledger.get(2), Some(&alice));
        assert_eq!(ledger.get(3), None);
    }

    #[test]
    fn rejects_entries_past_capacity() {
        let mut ledger = Ledger::default();
        for _ in 0..MAX_PLAYERS {
            ledger.push(Pubkey::new_unique()).unwrap();
        }
        assert_eq!(ledger.push(Pubkey::new_unique()), Err(RaffleError::RaffleFull));
        assert_eq!(ledger.len(), MAX_PLAYERS);
        assert_eq!(borsh::to_vec(&ledger).unwrap().len(), Ledger::MAX_LEN);

        ledger.clear();
        assert!(ledger.is_empty());
    }
}
