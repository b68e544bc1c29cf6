//! Program derived addresses of the metadata account and of the native
//! lookup table it owns.

use {
    crate::{error::UserLookupTableError, state::USER_LOOKUP_TABLE_SEED},
    solana_program::{
        address_lookup_table, clock::Slot, program_error::ProgramError, pubkey::Pubkey,
    },
};

/// Derives the metadata account address of the table `id` owned by `owner`.
pub fn find_user_lookup_table_address(
    owner: &Pubkey,
    id: u64,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), ProgramError> {
    Pubkey::try_find_program_address(
        &[USER_LOOKUP_TABLE_SEED, owner.as_ref(), &id.to_le_bytes()],
        program_id,
    )
    .ok_or_else(|| UserLookupTableError::DerivationFailed.into())
}

/// Signer seeds of the metadata account, for signing on behalf of the
/// native lookup table's authority.
pub fn user_lookup_table_signer_seeds<'a>(
    owner: &'a Pubkey,
    id_bytes: &'a [u8; 8],
    bump_seed: &'a [u8; 1],
) -> [&'a [u8]; 4] {
    [USER_LOOKUP_TABLE_SEED, owner.as_ref(), &id_bytes[..], &bump_seed[..]]
}

/// Derives the native lookup table address for `authority`, using the same
/// seeds as the native address lookup table program.
pub fn find_native_table_address(
    authority: &Pubkey,
    recent_slot: Slot,
) -> Result<(Pubkey, u8), ProgramError> {
    Pubkey::try_find_program_address(
        &[authority.as_ref(), &recent_slot.to_le_bytes()],
        &address_lookup_table::program::id(),
    )
    .ok_or_else(|| UserLookupTableError::DerivationFailed.into())
}

/// Derives both addresses of a new table: `(metadata, native_table)`.
pub fn find_lookup_table_addresses(
    owner: &Pubkey,
    id: u64,
    recent_slot: Slot,
    program_id: &Pubkey,
) -> Result<(Pubkey, Pubkey), ProgramError> {
    let (metadata_address, _) = find_user_lookup_table_address(owner, id, program_id)?;
    let (native_table_address, _) = find_native_table_address(&metadata_address, recent_slot)?;
    Ok((metadata_address, native_table_address))
}
