// In-memory collaborators for unit tests
use solana_program::pubkey::Pubkey;
use std::collections::HashMap;

use crate::{
    config::RequestConfig, custody::Custody, error::RaffleError, tracker::RequestId,
    vrf::RandomnessOracle,
};

#[derive(Default)]
pub struct MemoryCustody {
    pool: u64,
    paid: HashMap<Pubkey, u64>,
    refuse_payouts: bool,
    refuse_deposits: bool,
}

impl MemoryCustody {
    pub fn with_balance(pool: u64) -> Self {
        Self {
            pool,
            ..Self::default()
        }
    }

    pub fn refusing_payouts(mut self) -> Self {
        self.refuse_payouts = true;
        self
    }

    pub fn refusing_deposits(mut self) -> Self {
        self.refuse_deposits = true;
        self
    }

    pub fn paid_to(&self, recipient: &Pubkey) -> u64 {
        self.paid.get(recipient).copied().unwrap_or(0)
    }
}

impl Custody for MemoryCustody {
    fn balance(&self) -> u64 {
        self.pool
    }

    fn credit(&mut self, _from: &Pubkey, amount: u64) -> Result<(), RaffleError> {
        if self.refuse_deposits {
            return Err(RaffleError::DepositFailed);
        }
        self.pool = self
            .pool
            .checked_add(amount)
            .ok_or(RaffleError::DepositFailed)?;
        Ok(())
    }

    fn debit_all(&mut self, to: &Pubkey) -> Result<u64, RaffleError> {
        if self.refuse_payouts {
            return Err(RaffleError::PayoutFailed);
        }
        let amount = std::mem::take(&mut self.pool);
        *self.paid.entry(*to).or_insert(0) += amount;
        Ok(amount)
    }
}

/// Hands out sequential request ids and records every request
#[derive(Default)]
pub struct ScriptedOracle {
    pub requests: Vec<(RequestConfig, u64)>,
    pub fail: bool,
}

impl RandomnessOracle for ScriptedOracle {
    fn request_randomness(
        &mut self,
        config: &RequestConfig,
        nonce: u64,
    ) -> Result<RequestId, RaffleError> {
        if self.fail {
            return Err(RaffleError::RandomnessRequestFailed);
        }
        self.requests.push((*config, nonce));
        Ok(RequestId(nonce + 1))
    }
}
