// Pool custody: where entrance fees are held and how the pool leaves
use solana_program::{
    account_info::AccountInfo, msg, program::invoke, pubkey::Pubkey, system_instruction,
};

use crate::error::RaffleError;

/// Holds the raffle pool on behalf of the state machine.
///
/// Both mutating calls are all-or-nothing: on error no lamports have moved.
pub trait Custody {
    /// Lamports currently in the pool
    fn balance(&self) -> u64;

    /// Moves `amount` from `from` into the pool
    fn credit(&mut self, from: &Pubkey, amount: u64) -> Result<(), RaffleError>;

    /// Pays the whole pool to `to` and returns the amount paid
    fn debit_all(&mut self, to: &Pubkey) -> Result<u64, RaffleError>;
}

/// Custody backed by the program-owned raffle account's lamports.
///
/// Lamports below `rent_reserve` keep the account alive and are never part of the pool.
pub struct AccountCustody<'a, 'b> {
    vault: &'b AccountInfo<'a>,
    rent_reserve: u64,
    depositor: Option<(&'b AccountInfo<'a>, &'b AccountInfo<'a>)>,
    recipient: Option<&'b AccountInfo<'a>>,
}

impl<'a, 'b> AccountCustody<'a, 'b> {
    pub fn new(vault: &'b AccountInfo<'a>, rent_reserve: u64) -> Self {
        Self {
            vault,
            rent_reserve,
            depositor: None,
            recipient: None,
        }
    }

    /// Account allowed to deposit, with the system program used for the transfer
    pub fn with_depositor(
        mut self,
        depositor: &'b AccountInfo<'a>,
        system_program: &'b AccountInfo<'a>,
    ) -> Self {
        self.depositor = Some((depositor, system_program));
        self
    }

    /// Account the pool may be paid out to
    pub fn with_recipient(mut self, recipient: &'b AccountInfo<'a>) -> Self {
        self.recipient = Some(recipient);
        self
    }
}

impl<'a, 'b> Custody for AccountCustody<'a, 'b> {
    fn balance(&self) -> u64 {
        self.vault.lamports().saturating_sub(self.rent_reserve)
    }

    fn credit(&mut self, from: &Pubkey, amount: u64) -> Result<(), RaffleError> {
        let (depositor, system_program) = match self.depositor {
            Some(accounts) if accounts.0.key == from => accounts,
            _ => {
                msg!("No depositor account supplied for {}", from);
                return Err(RaffleError::DepositFailed);
            }
        };

        invoke(
            &system_instruction::transfer(depositor.key, self.vault.key, amount),
            &[depositor.clone(), self.vault.clone(), system_program.clone()],
        )
        .map_err(|err| {
            msg!("Transfer of {} lamports from {} failed: {}", amount, from, err);
            RaffleError::DepositFailed
        })
    }

    fn debit_all(&mut self, to: &Pubkey) -> Result<u64, RaffleError> {
        let recipient = match self.recipient {
            Some(recipient) if recipient.key == to => recipient,
            Some(recipient) => {
                msg!("Recipient account {} is not the winner {}", recipient.key, to);
                return Err(RaffleError::PayoutFailed);
            }
            None => {
                msg!("No recipient account supplied for {}", to);
                return Err(RaffleError::PayoutFailed);
            }
        };
        if !recipient.is_writable {
            msg!("Winner account {} is not writable", to);
            return Err(RaffleError::PayoutFailed);
        }

        let amount = self.balance();
        let credited = recipient
            .lamports()
            .checked_add(amount)
            .ok_or(RaffleError::PayoutFailed)?;

        let mut vault_lamports = self
            .vault
            .try_borrow_mut_lamports()
            .map_err(|_| RaffleError::PayoutFailed)?;
        let mut recipient_lamports = recipient
            .try_borrow_mut_lamports()
            .map_err(|_| RaffleError::PayoutFailed)?;

        **vault_lamports -= amount;
        **recipient_lamports = credited;
        Ok(amount)
    }
}
