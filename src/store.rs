//! Capabilities the lifecycle needs from its runtime: reading accounts and
//! reading the current slot.

use {
    solana_program::{
        account_info::AccountInfo,
        clock::{Clock, Slot},
        pubkey::Pubkey,
    },
    std::collections::HashMap,
};

/// An owned snapshot of an account.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawAccount {
    pub lamports: u64,
    pub data: Vec<u8>,
    pub owner: Pubkey,
}

impl RawAccount {
    pub fn new(lamports: u64, data: Vec<u8>, owner: Pubkey) -> Self {
        Self {
            lamports,
            data,
            owner,
        }
    }
}

/// Read access to accounts by address. `None` means the account does not
/// exist.
pub trait AccountStore {
    fn fetch(&self, address: &Pubkey) -> Option<RawAccount>;
}

/// Source of the current slot.
pub trait SlotClock {
    fn current_slot(&self) -> Slot;
}

impl SlotClock for Clock {
    fn current_slot(&self) -> Slot {
        self.slot
    }
}

impl SlotClock for Slot {
    fn current_slot(&self) -> Slot {
        *self
    }
}

impl AccountStore for HashMap<Pubkey, RawAccount> {
    fn fetch(&self, address: &Pubkey) -> Option<RawAccount> {
        self.get(address).cloned()
    }
}

/// Store over the accounts passed to an instruction. Accounts without
/// lamports or data are reported as missing.
pub struct AccountInfoStore<'a, 'b> {
    accounts: &'a [AccountInfo<'b>],
}

impl<'a, 'b> AccountInfoStore<'a, 'b> {
    pub fn new(accounts: &'a [AccountInfo<'b>]) -> Self {
        Self { accounts }
    }
}

impl AccountStore for AccountInfoStore<'_, '_> {
    fn fetch(&self, address: &Pubkey) -> Option<RawAccount> {
        let info = self.accounts.iter().find(|info| info.key == address)?;
        let data = info.try_borrow_data().ok()?;
        if info.lamports() == 0 && data.is_empty() {
            return None;
        }
        Some(RawAccount::new(info.lamports(), data.to_vec(), *info.owner))
    }
}
