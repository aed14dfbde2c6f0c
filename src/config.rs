use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::RaffleError;

/// Block confirmations the oracle waits before answering
pub const REQUEST_CONFIRMATIONS: u16 = 3;
/// Random words requested per round; settlement uses the first
pub const NUM_WORDS: u32 = 1;

/// Parameters forwarded to the randomness oracle with every request
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestConfig {
    /// Oracle key hash (gas lane) selecting the proving key and price tier
    pub key_hash: [u8; 32],
    /// Oracle subscription billed for the request
    pub subscription_id: u64,
    /// Confirmations to wait before fulfilling
    pub request_confirmations: u16,
    /// Compute/gas budget for the fulfillment callback
    pub callback_gas_limit: u32,
    /// Number of random words to deliver
    pub num_words: u32,
}

impl RequestConfig {
    pub const LEN: usize = 32 + 8 + 2 + 4 + 4;

    pub fn new(key_hash: [u8; 32], subscription_id: u64, callback_gas_limit: u32) -> Self {
        Self {
            key_hash,
            subscription_id,
            request_confirmations: REQUEST_CONFIRMATIONS,
            callback_gas_limit,
            num_words: NUM_WORDS,
        }
    }
}

/// Immutable per-instance raffle parameters
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaffleConfig {
    /// Minimum payment in lamports to join a round
    pub entrance_fee: u64,
    /// Seconds that must pass after the last settlement before the next one
    pub interval: u64,
    pub request_config: RequestConfig,
}

impl RaffleConfig {
    pub const LEN: usize = 8 + 8 + RequestConfig::LEN;

    pub fn new(
        entrance_fee: u64,
        interval: u64,
        request_config: RequestConfig,
    ) -> Result<Self, RaffleError> {
        let config = Self {
            entrance_fee,
            interval,
            request_config,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RaffleError> {
        if self.entrance_fee == 0 || self.interval == 0 || self.request_config.num_words == 0 {
            return Err(RaffleError::InvalidConfig);
        }
        Ok(())
    }
}
