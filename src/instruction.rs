use arrayref::array_ref;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};
use std::convert::TryInto;

use crate::{
    config::RequestConfig, error::RaffleError, tracker::RequestId, utils, vrf::RandomWord,
};

#[derive(Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Create the raffle account and open the first round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Payer funding the raffle account
    /// 1. `[writable]` The raffle account (PDA, seed "raffle")
    /// 2. `[]` Oracle key allowed to fulfill randomness
    /// 3. `[]` The system program
    Initialize {
        /// Minimum entry payment in lamports
        entrance_fee: u64,
        /// Seconds between settlements
        interval: u64,
        request_config: RequestConfig,
    },

    /// Enter the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The participant paying the entry
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    Enter {
        /// Lamports paid; must cover the entrance fee, any excess goes to the pool
        amount: u64,
    },

    /// Evaluate the upkeep gate; result is written as return data
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep { check_data: Vec<u8> },

    /// Close the round and request randomness (anyone may call)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The caller
    /// 1. `[writable]` The raffle account
    PerformUpkeep { perform_data: Vec<u8> },

    /// Deliver randomness for the outstanding request and pay the winner
    ///
    /// Accounts expected:
    /// 0. `[signer]` The configured oracle
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` The winning participant
    FulfillRandomWords {
        request_id: RequestId,
        random_words: Vec<RandomWord>,
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(RaffleError::InvalidInstruction)?;

        Ok(match tag {
            0 => {
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (interval, rest) = Self::unpack_u64(rest)?;
                let (key_hash, rest) = Self::unpack_fixed_bytes::<32>(rest)?;
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (request_confirmations, rest) = Self::unpack_u16(rest)?;
                let (callback_gas_limit, rest) = Self::unpack_u32(rest)?;
                let (num_words, _) = Self::unpack_u32(rest)?;
                Self::Initialize {
                    entrance_fee,
                    interval,
                    request_config: RequestConfig {
                        key_hash,
                        subscription_id,
                        request_confirmations,
                        callback_gas_limit,
                        num_words,
                    },
                }
            }
            1 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::Enter { amount }
            }
            2 => {
                let (check_data, _) = Self::unpack_bytes(rest)?;
                Self::CheckUpkeep {
                    check_data: check_data.to_vec(),
                }
            }
            3 => {
                let (perform_data, _) = Self::unpack_bytes(rest)?;
                Self::PerformUpkeep {
                    perform_data: perform_data.to_vec(),
                }
            }
            4 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (count, mut rest) = Self::unpack_u32(rest)?;
                let mut random_words = Vec::with_capacity((count as usize).min(rest.len() / 32));
                for _ in 0..count {
                    let (word, next) = Self::unpack_fixed_bytes::<32>(rest)?;
                    random_words.push(word);
                    rest = next;
                }
                Self::FulfillRandomWords {
                    request_id: RequestId(request_id),
                    random_words,
                }
            }
            _ => return Err(RaffleError::InvalidInstruction.into()),
        })
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Self::Initialize {
                entrance_fee,
                interval,
                request_config,
            } => {
                buf.push(0);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
                buf.extend_from_slice(&request_config.key_hash);
                buf.extend_from_slice(&request_config.subscription_id.to_le_bytes());
                buf.extend_from_slice(&request_config.request_confirmations.to_le_bytes());
                buf.extend_from_slice(&request_config.callback_gas_limit.to_le_bytes());
                buf.extend_from_slice(&request_config.num_words.to_le_bytes());
            }
            Self::Enter { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep { check_data } => {
                buf.push(2);
                Self::pack_bytes(&mut buf, check_data);
            }
            Self::PerformUpkeep { perform_data } => {
                buf.push(3);
                Self::pack_bytes(&mut buf, perform_data);
            }
            Self::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                buf.push(4);
                buf.extend_from_slice(&request_id.0.to_le_bytes());
                buf.extend_from_slice(&(random_words.len() as u32).to_le_bytes());
                for word in random_words {
                    buf.extend_from_slice(word);
                }
            }
        }
        buf
    }

    fn unpack_u16(input: &[u8]) -> Result<(u16, &[u8]), ProgramError> {
        if input.len() < 2 {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (bytes, rest) = input.split_at(2);
        Ok((u16::from_le_bytes(*array_ref![bytes, 0, 2]), rest))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        if input.len() < 4 {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (bytes, rest) = input.split_at(4);
        Ok((u32::from_le_bytes(*array_ref![bytes, 0, 4]), rest))
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        if input.len() < 8 {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (bytes, rest) = input.split_at(8);
        Ok((u64::from_le_bytes(*array_ref![bytes, 0, 8]), rest))
    }

    fn unpack_fixed_bytes<const N: usize>(input: &[u8]) -> Result<([u8; N], &[u8]), ProgramError> {
        if input.len() < N {
            return Err(RaffleError::InvalidInstruction.into());
        }
        let (bytes, rest) = input.split_at(N);
        let bytes: [u8; N] = bytes
            .try_into()
            .map_err(|_| RaffleError::InvalidInstruction)?;
        Ok((bytes, rest))
    }

    /// u32 length prefix followed by the bytes
    fn unpack_bytes(input: &[u8]) -> Result<(&[u8], &[u8]), ProgramError> {
        let (len, rest) = Self::unpack_u32(input)?;
        let len = len as usize;
        if rest.len() < len {
            return Err(RaffleError::InvalidInstruction.into());
        }
        Ok(rest.split_at(len))
    }

    fn pack_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
        buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(bytes);
    }
}

/// Create initialize instruction
pub fn initialize(
    program_id: &Pubkey,
    payer: &Pubkey,
    oracle: &Pubkey,
    entrance_fee: u64,
    interval: u64,
    request_config: RequestConfig,
) -> Instruction {
    let (raffle, _) = utils::find_raffle_address(program_id);
    let data = RaffleInstruction::Initialize {
        entrance_fee,
        interval,
        request_config,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(raffle, false),
            AccountMeta::new_readonly(*oracle, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    }
}

/// Create enter instruction
pub fn enter(program_id: &Pubkey, player: &Pubkey, amount: u64) -> Instruction {
    let (raffle, _) = utils::find_raffle_address(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*player, true),
            AccountMeta::new(raffle, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: RaffleInstruction::Enter { amount }.pack(),
    }
}

/// Create check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey, check_data: Vec<u8>) -> Instruction {
    let (raffle, _) = utils::find_raffle_address(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(raffle, false)],
        data: RaffleInstruction::CheckUpkeep { check_data }.pack(),
    }
}

/// Create perform_upkeep instruction
pub fn perform_upkeep(program_id: &Pubkey, caller: &Pubkey, perform_data: Vec<u8>) -> Instruction {
    let (raffle, _) = utils::find_raffle_address(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*caller, true),
            AccountMeta::new(raffle, false),
        ],
        data: RaffleInstruction::PerformUpkeep { perform_data }.pack(),
    }
}

/// Create fulfill_random_words instruction
pub fn fulfill_random_words(
    program_id: &Pubkey,
    oracle: &Pubkey,
    winner: &Pubkey,
    request_id: RequestId,
    random_words: Vec<RandomWord>,
) -> Instruction {
    let (raffle, _) = utils::find_raffle_address(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*oracle, true),
            AccountMeta::new(raffle, false),
            AccountMeta::new(*winner, false),
        ],
        data: RaffleInstruction::FulfillRandomWords {
            request_id,
            random_words,
        }
        .pack(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_what_it_packs() {
        let instructions = vec![
            RaffleInstruction::Initialize {
                entrance_fee: 10_000_000,
                interval: 30,
                request_config: RequestConfig::new([3; 32], 99, 500_000),
            },
            RaffleInstruction::Enter { amount: 42 },
            RaffleInstruction::CheckUpkeep { check_data: vec![] },
            RaffleInstruction::PerformUpkeep {
                perform_data: vec![1, 2, 3],
            },
            RaffleInstruction::FulfillRandomWords {
                request_id: RequestId(77),
                random_words: vec![[5; 32], [6; 32]],
            },
        ];
        for instruction in instructions {
            assert_eq!(
                RaffleInstruction::unpack(&instruction.pack()).unwrap(),
                instruction
            );
        }
    }

    #[test]
    fn initialize_layout() {
        let data = RaffleInstruction::Initialize {
            entrance_fee: 1,
            interval: 2,
            request_config: RequestConfig::new([0; 32], 3, 4),
        }
        .pack();
        assert_eq!(data.len(), 1 + 8 + 8 + RequestConfig::LEN);
        assert_eq!(data[0], 0);
        assert_eq!(&data[1..9], &1u64.to_le_bytes());
    }

    #[test]
    fn rejects_short_or_unknown_input() {
        let invalid: ProgramError = RaffleError::InvalidInstruction.into();
        assert_eq!(RaffleInstruction::unpack(&[]), Err(invalid.clone()));
        assert_eq!(RaffleInstruction::unpack(&[9]), Err(invalid.clone()));
        assert_eq!(RaffleInstruction::unpack(&[1, 0, 0]), Err(invalid.clone()));
        assert_eq!(
            RaffleInstruction::unpack(&[3, 5, 0, 0, 0, 1]),
            Err(invalid.clone())
        );

        let mut truncated = RaffleInstruction::FulfillRandomWords {
            request_id: RequestId(1),
            random_words: vec![[1; 32]],
        }
        .pack();
        truncated.pop();
        assert_eq!(RaffleInstruction::unpack(&truncated), Err(invalid));
    }
}
