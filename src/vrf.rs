// Randomness oracle boundary
use arrayref::array_ref;
use solana_program::{clock::Slot, keccak, msg, pubkey::Pubkey};

use crate::{config::RequestConfig, error::RaffleError, tracker::RequestId};

/// One oracle-supplied random value, a 256-bit big-endian integer
pub type RandomWord = [u8; 32];

/// Source of asynchronously delivered randomness.
///
/// A request only yields an id; the value arrives later through the raffle's
/// fulfillment entry point, possibly never.
pub trait RandomnessOracle {
    fn request_randomness(
        &mut self,
        config: &RequestConfig,
        nonce: u64,
    ) -> Result<RequestId, RaffleError>;
}

/// Publishes requests in the program log for an off-chain oracle node.
///
/// The id is derived from the key hash, the raffle address, the request nonce
/// and the current slot, so it cannot be predicted before the request lands.
pub struct LogOracle {
    raffle: Pubkey,
    slot: Slot,
}

impl LogOracle {
    pub fn new(raffle: Pubkey, slot: Slot) -> Self {
        Self { raffle, slot }
    }
}

impl RandomnessOracle for LogOracle {
    fn request_randomness(
        &mut self,
        config: &RequestConfig,
        nonce: u64,
    ) -> Result<RequestId, RaffleError> {
        let hash = keccak::hashv(&[
            &config.key_hash,
            self.raffle.as_ref(),
            &nonce.to_le_bytes(),
            &self.slot.to_le_bytes(),
        ])
        .to_bytes();
        let request_id = RequestId(u64::from_le_bytes(*array_ref![hash, 0, 8]));

        msg!(
            "Randomness request {}: subscription={}, confirmations={}, gas={}, words={}",
            request_id,
            config.subscription_id,
            config.request_confirmations,
            config.callback_gas_limit,
            config.num_words
        );
        Ok(request_id)
    }
}

/// Widens a u64 into a random word
pub fn word_from_u64(value: u64) -> RandomWord {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// `word mod modulus` over the full 256-bit value; `None` when `modulus` is zero
pub fn reduce_word(word: &RandomWord, modulus: u64) -> Option<u64> {
    if modulus == 0 {
        return None;
    }
    let modulus = modulus as u128;
    let remainder = word
        .iter()
        .fold(0u128, |acc, byte| ((acc << 8) | *byte as u128) % modulus);
    Some(remainder as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_matches_u64_modulo() {
        for value in [0u64, 1, 3, 4, 7, 1_000_003, u64::MAX] {
            for modulus in [1u64, 2, 3, 4, 250, u64::MAX] {
                assert_eq!(
                    reduce_word(&word_from_u64(value), modulus),
                    Some(value % modulus)
                );
            }
        }
        assert_eq!(reduce_word(&[0xff; 32], 0), None);
    }

    #[test]
    fn reduction_uses_high_bytes() {
        // 2^64 mod 3 == 1
        let mut word = [0u8; 32];
        word[23] = 1;
        assert_eq!(reduce_word(&word, 3), Some(1));
        // 2^255 mod 4 == 0
        let mut word = [0u8; 32];
        word[0] = 0x80;
        assert_eq!(reduce_word(&word, 4), Some(0));
    }

    #[test]
    fn log_oracle_ids_depend_on_nonce_and_slot() {
        let raffle = Pubkey::new_unique();
        let config = RequestConfig::new([9; 32], 1, 500_000);

        let first = LogOracle::new(raffle, 10)
            .request_randomness(&config, 0)
            .unwrap();
        let again = LogOracle::new(raffle, 10)
            .request_randomness(&config, 0)
            .unwrap();
        let next_nonce = LogOracle::new(raffle, 10)
            .request_randomness(&config, 1)
            .unwrap();
        let next_slot = LogOracle::new(raffle, 11)
            .request_randomness(&config, 0)
            .unwrap();

        assert_eq!(first, again);
        assert_ne!(first, next_nonce);
        assert_ne!(first, next_slot);
    }
}
