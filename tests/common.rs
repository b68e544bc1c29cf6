#![allow(dead_code)]
use {
    solana_program_test::*,
    solana_programs_user_lookup_table::{
        id, instruction::create_lookup_table, native::NativeTable, processor::process_instruction,
        state::ProgramState,
    },
    solana_sdk::{
        clock::{Clock, Slot},
        hash::Hash,
        instruction::{Instruction, InstructionError},
        pubkey::Pubkey,
        signature::{Keypair, Signer},
        slot_hashes::SlotHashes,
        transaction::{Transaction, TransactionError},
    },
};

/// Slot every test table is created at.
pub const CREATION_SLOT: Slot = 100;

pub async fn setup_test_context() -> ProgramTestContext {
    let program_test = ProgramTest::new(
        "solana_programs_user_lookup_table",
        id(),
        processor!(process_instruction),
    );
    let mut context = program_test.start_with_context().await;
    context.warp_to_slot(CREATION_SLOT).unwrap();
    context
}

pub async fn current_slot(context: &mut ProgramTestContext) -> Slot {
    context
        .banks_client
        .get_sysvar::<Clock>()
        .await
        .unwrap()
        .slot
}

pub async fn process_ix(
    context: &mut ProgramTestContext,
    ix: Instruction,
    owner_keypair: Option<&Keypair>,
) -> Result<(), BanksClientError> {
    let recent_blockhash = context.get_new_latest_blockhash().await.unwrap();
    let payer = &context.payer;

    let mut signers = vec![payer];
    if let Some(owner) = owner_keypair {
        signers.push(owner);
    }

    let transaction = Transaction::new_signed_with_payer(
        &[ix],
        Some(&payer.pubkey()),
        &signers,
        recent_blockhash,
    );
    context.banks_client.process_transaction(transaction).await
}

pub async fn assert_ix_error(
    context: &mut ProgramTestContext,
    ix: Instruction,
    owner_keypair: Option<&Keypair>,
    expected_err: InstructionError,
) {
    assert_eq!(
        process_ix(context, ix, owner_keypair)
            .await
            .unwrap_err()
            .unwrap(),
        TransactionError::InstructionError(0, expected_err),
    );
}

pub fn overwrite_slot_hashes_with_slots(context: &ProgramTestContext, slots: &[Slot]) {
    let mut slot_hashes = SlotHashes::default();
    for slot in slots {
        slot_hashes.add(*slot, Hash::new_unique());
    }
    context.set_sysvar(&slot_hashes);
}

/// Creates table `id` for the payer, returning the metadata and native
/// table addresses.
pub async fn create_user_lookup_table(
    context: &mut ProgramTestContext,
    id: u64,
) -> (Pubkey, Pubkey) {
    let recent_slot = current_slot(context).await - 1;
    overwrite_slot_hashes_with_slots(context, &[recent_slot]);

    let (ix, metadata, native_table) =
        create_lookup_table(context.payer.pubkey(), id, recent_slot).unwrap();
    process_ix(context, ix, None).await.unwrap();
    (metadata, native_table)
}

pub async fn get_user_lookup_table(
    context: &mut ProgramTestContext,
    metadata: Pubkey,
) -> ProgramState {
    let account = context
        .banks_client
        .get_account(metadata)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.owner, id());
    ProgramState::deserialize(&account.data).unwrap()
}

pub async fn get_native_table(
    context: &mut ProgramTestContext,
    native_table: Pubkey,
) -> NativeTable {
    let account = context
        .banks_client
        .get_account(native_table)
        .await
        .unwrap()
        .unwrap();
    NativeTable::deserialize(&account.data).unwrap()
}
