use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError,
    program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstruction,

    /// Entrance fee or interval is zero, or the randomness request asks for no words
    #[error("Invalid raffle configuration")]
    InvalidConfig,

    /// Paid amount is below the entrance fee
    #[error("Paid amount is below the entrance fee")]
    InsufficientFee,

    /// Entries are only accepted while the raffle is open
    #[error("Raffle is not open")]
    RaffleNotOpen,

    /// The round already holds the maximum number of entries
    #[error("Raffle round is full")]
    RaffleFull,

    /// Participant deposit could not be moved into custody
    #[error("Deposit into the raffle pool failed")]
    DepositFailed,

    /// At least one upkeep condition does not hold
    #[error("Upkeep not needed")]
    UpkeepNotNeeded,

    /// The randomness oracle refused the request
    #[error("Randomness request failed")]
    RandomnessRequestFailed,

    /// Fulfillment does not match the outstanding request
    #[error("Unknown randomness request")]
    UnknownRequest,

    /// Fulfillment was not signed by the configured oracle
    #[error("Only the configured oracle can fulfill randomness")]
    OnlyOracleCanFulfill,

    /// The pool could not be paid to the winner
    #[error("Payout to the winner failed")]
    PayoutFailed,

    /// The raffle account is not the program's raffle address
    #[error("Invalid raffle account")]
    InvalidRaffleAccount,

    /// The raffle account has not been initialized
    #[error("Raffle not initialized")]
    NotInitialized,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}

impl PrintProgramError for RaffleError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_custom_program_error() {
        assert_eq!(
            ProgramError::from(RaffleError::InsufficientFee),
            ProgramError::Custom(2)
        );
        assert_eq!(
            ProgramError::from(RaffleError::PayoutFailed),
            ProgramError::Custom(RaffleError::PayoutFailed as u32)
        );
    }
}
