use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::clock::UnixTimestamp;
use std::fmt;

use crate::error::RaffleError;

/// Identifier the oracle echoes back on fulfillment
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The single in-flight randomness request
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutstandingRequest {
    pub request_id: RequestId,
    pub issued_at: UnixTimestamp,
}

/// Tracks the outstanding randomness request and the nonce used to derive the next one
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestTracker {
    nonce: u64,
    outstanding: Option<OutstandingRequest>,
}

impl RequestTracker {
    pub const LEN: usize = 8 + 1 + 8 + 8;

    /// Nonce handed to the oracle for the next request
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn outstanding(&self) -> Option<&OutstandingRequest> {
        self.outstanding.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Records a freshly issued request. Fails if one is already in flight.
    pub fn register(
        &mut self,
        request_id: RequestId,
        issued_at: UnixTimestamp,
    ) -> Result<(), RaffleError> {
        if self.outstanding.is_some() {
            return Err(RaffleError::UpkeepNotNeeded);
        }
        self.outstanding = Some(OutstandingRequest {
            request_id,
            issued_at,
        });
        self.nonce = self.nonce.wrapping_add(1);
        Ok(())
    }

    /// Returns the outstanding request if `request_id` names it
    pub fn matching(&self, request_id: RequestId) -> Result<&OutstandingRequest, RaffleError> {
        match &self.outstanding {
            Some(outstanding) if outstanding.request_id == request_id => Ok(outstanding),
            _ => Err(RaffleError::UnknownRequest),
        }
    }

    pub fn clear(&mut self) {
        self.outstanding = None;
    }
}
