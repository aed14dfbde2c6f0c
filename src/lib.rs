// Self-settling raffle: fixed-fee entries, interval-gated upkeep and
// oracle-supplied randomness picking a winner for the whole pool

// Round state machine
pub mod config;
pub mod error;
pub mod ledger;
pub mod raffle;
pub mod settlement;
pub mod state;
pub mod tracker;
pub mod upkeep;

// Collaborator boundaries
pub mod custody;
pub mod event;
pub mod vrf;

// Program surface
pub mod instruction;
pub mod processor;
pub mod utils;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

#[cfg(test)]
mod testing;
