//! Program instructions and their builders.

use {
    crate::{error::MapToProgramIoError, pda::find_lookup_table_addresses},
    bincode::Options,
    serde::{Deserialize, Serialize},
    solana_program::{
        account_info::AccountInfo,
        address_lookup_table,
        clock::Slot,
        instruction::{AccountMeta, Instruction},
        program_error::ProgramError,
        pubkey::Pubkey,
        system_program, sysvar,
    },
};

/// Largest instruction payload a transaction packet can carry.
const MAX_INSTRUCTION_DATA_LEN: u64 = 1232;

/// Number of accounts every instruction takes before any extend candidates.
pub const FIXED_ACCOUNTS_LEN: usize = 6;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub enum UserLookupTableInstruction {
    /// Create a metadata account and the native lookup table it owns.
    ///
    /// # Account references
    ///   0. `[WRITE, SIGNER]` Owner, also pays for both accounts
    ///   1. `[]` System program
    ///   2. `[]` Native address lookup table program
    ///   3. `[WRITE]` Uninitialized native lookup table, derived from the
    ///      metadata account address and `recent_slot`
    ///   4. `[WRITE]` Uninitialized metadata account, derived from the owner
    ///      address and `id`
    ///   5. `[]` Rent sysvar
    CreateLookupTable {
        /// A recent slot must be used in the derivation path of the native
        /// table, so every native table address is unique.
        recent_slot: Slot,
        /// Owner-chosen id of the table.
        id: u64,
    },

    /// Append the candidate addresses that are not yet in the table.
    ///
    /// # Account references
    ///   0-5. Same as [`Self::CreateLookupTable`]; the owner pays for any
    ///        extra rent of the native table
    ///   6.. `[]` Candidate addresses, in the order they should be appended
    ExtendLookupTable,

    /// Deactivate the native lookup table. A deactivated table can no longer
    /// be extended and becomes closeable once the deactivation cooldown of
    /// the native program has elapsed.
    ///
    /// # Account references
    ///   0-5. Same as [`Self::CreateLookupTable`]
    DeactivateLookupTable,

    /// Close a deactivated table, returning the lamports of both accounts to
    /// the owner.
    ///
    /// # Account references
    ///   0-5. Same as [`Self::CreateLookupTable`]
    CloseLookupTable,
}

impl UserLookupTableInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        bincode::options()
            .with_limit(MAX_INSTRUCTION_DATA_LEN)
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .deserialize(input)
            .map_to_program_io_error()
    }

    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        bincode::serialize(self).map_to_program_io_error()
    }
}

/// Signer and writable privileges of an instruction account, with the
/// integer codes used by client tooling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AccountRole {
    ReadOnly = 0,
    Writable = 1,
    ReadOnlySigner = 2,
    WritableSigner = 3,
}

impl AccountRole {
    pub const fn new(is_signer: bool, is_writable: bool) -> Self {
        match (is_signer, is_writable) {
            (false, false) => Self::ReadOnly,
            (false, true) => Self::Writable,
            (true, false) => Self::ReadOnlySigner,
            (true, true) => Self::WritableSigner,
        }
    }

    pub const fn is_signer(self) -> bool {
        matches!(self, Self::ReadOnlySigner | Self::WritableSigner)
    }

    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Writable | Self::WritableSigner)
    }

    pub fn account_meta(self, pubkey: Pubkey) -> AccountMeta {
        AccountMeta {
            pubkey,
            is_signer: self.is_signer(),
            is_writable: self.is_writable(),
        }
    }

    pub fn of_meta(meta: &AccountMeta) -> Self {
        Self::new(meta.is_signer, meta.is_writable)
    }

    pub fn of_account_info(info: &AccountInfo) -> Self {
        Self::new(info.is_signer, info.is_writable)
    }
}

impl From<AccountRole> for u8 {
    fn from(role: AccountRole) -> Self {
        role as u8
    }
}

impl TryFrom<u8> for AccountRole {
    type Error = ProgramError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::ReadOnly),
            1 => Ok(Self::Writable),
            2 => Ok(Self::ReadOnlySigner),
            3 => Ok(Self::WritableSigner),
            _ => Err(ProgramError::InvalidArgument),
        }
    }
}

fn fixed_account_metas(owner: Pubkey, metadata: Pubkey, native_table: Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountRole::WritableSigner.account_meta(owner),
        AccountRole::ReadOnly.account_meta(system_program::id()),
        AccountRole::ReadOnly.account_meta(address_lookup_table::program::id()),
        AccountRole::Writable.account_meta(native_table),
        AccountRole::Writable.account_meta(metadata),
        AccountRole::ReadOnly.account_meta(sysvar::rent::id()),
    ]
}

/// Constructs an instruction to create a user lookup table, returning it
/// along with the derived metadata and native table addresses.
pub fn create_lookup_table(
    owner: Pubkey,
    id: u64,
    recent_slot: Slot,
) -> Result<(Instruction, Pubkey, Pubkey), ProgramError> {
    let (metadata, native_table) =
        find_lookup_table_addresses(&owner, id, recent_slot, &crate::id())?;
    let instruction = Instruction::new_with_bincode(
        crate::id(),
        &UserLookupTableInstruction::CreateLookupTable { recent_slot, id },
        fixed_account_metas(owner, metadata, native_table),
    );
    Ok((instruction, metadata, native_table))
}

/// Constructs an instruction that extends a user lookup table. Every
/// candidate is carried as given; the program filters out addresses that
/// are already stored.
pub fn extend_lookup_table(
    owner: Pubkey,
    metadata: Pubkey,
    native_table: Pubkey,
    candidates: &[Pubkey],
) -> Instruction {
    let mut accounts = fixed_account_metas(owner, metadata, native_table);
    accounts.extend(
        candidates
            .iter()
            .map(|address| AccountRole::ReadOnly.account_meta(*address)),
    );
    Instruction::new_with_bincode(
        crate::id(),
        &UserLookupTableInstruction::ExtendLookupTable,
        accounts,
    )
}

/// Constructs an instruction that deactivates a user lookup table.
pub fn deactivate_lookup_table(
    owner: Pubkey,
    metadata: Pubkey,
    native_table: Pubkey,
) -> Instruction {
    Instruction::new_with_bincode(
        crate::id(),
        &UserLookupTableInstruction::DeactivateLookupTable,
        fixed_account_metas(owner, metadata, native_table),
    )
}

/// Constructs an instruction that closes a deactivated user lookup table.
pub fn close_lookup_table(owner: Pubkey, metadata: Pubkey, native_table: Pubkey) -> Instruction {
    Instruction::new_with_bincode(
        crate::id(),
        &UserLookupTableInstruction::CloseLookupTable,
        fixed_account_metas(owner, metadata, native_table),
    )
}
