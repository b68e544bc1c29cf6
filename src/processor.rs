//! Program processor

use {
    crate::{
        instruction::{AccountRole, UserLookupTableInstruction},
        lifecycle::LookupTableLifecycle,
        pda::user_lookup_table_signer_seeds,
        state::USER_LOOKUP_TABLE_SIZE,
        store::AccountInfoStore,
    },
    solana_program::{
        account_info::{next_account_info, AccountInfo},
        address_lookup_table::{self, instruction as native_instruction},
        clock::{Clock, Slot},
        entrypoint::ProgramResult,
        msg,
        program::{invoke, invoke_signed},
        program_error::ProgramError,
        pubkey::Pubkey,
        rent::Rent,
        system_instruction, system_program,
        sysvar::Sysvar,
    },
};

/// The accounts every instruction starts with.
struct FixedAccounts<'a, 'b> {
    owner: &'a AccountInfo<'b>,
    system_program: &'a AccountInfo<'b>,
    native_program: &'a AccountInfo<'b>,
    native_table: &'a AccountInfo<'b>,
    metadata: &'a AccountInfo<'b>,
    rent_sysvar: &'a AccountInfo<'b>,
}

impl<'a, 'b> FixedAccounts<'a, 'b> {
    fn next<I>(account_info_iter: &mut I) -> Result<Self, ProgramError>
    where
        I: Iterator<Item = &'a AccountInfo<'b>>,
    {
        let owner = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;
        let native_program = next_account_info(account_info_iter)?;
        let native_table = next_account_info(account_info_iter)?;
        let metadata = next_account_info(account_info_iter)?;
        let rent_sysvar = next_account_info(account_info_iter)?;

        if !system_program::check_id(system_program.key)
            || !address_lookup_table::program::check_id(native_program.key)
        {
            return Err(ProgramError::IncorrectProgramId);
        }

        Ok(Self {
            owner,
            system_program,
            native_program,
            native_table,
            metadata,
            rent_sysvar,
        })
    }

    fn owner_signed(&self) -> bool {
        AccountRole::of_account_info(self.owner).is_signer()
    }
}

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    input: &[u8],
) -> ProgramResult {
    match UserLookupTableInstruction::unpack(input)? {
        UserLookupTableInstruction::CreateLookupTable { recent_slot, id } => {
            msg!("Instruction: CreateLookupTable");
            process_create_lookup_table(program_id, accounts, recent_slot, id)
        }
        UserLookupTableInstruction::ExtendLookupTable => {
            msg!("Instruction: ExtendLookupTable");
            process_extend_lookup_table(program_id, accounts)
        }
        UserLookupTableInstruction::DeactivateLookupTable => {
            msg!("Instruction: DeactivateLookupTable");
            process_deactivate_lookup_table(program_id, accounts)
        }
        UserLookupTableInstruction::CloseLookupTable => {
            msg!("Instruction: CloseLookupTable");
            process_close_lookup_table(program_id, accounts)
        }
    }
}

fn process_create_lookup_table(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    recent_slot: Slot,
    id: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let fixed = FixedAccounts::next(account_info_iter)?;

    let clock = Clock::get()?;
    let store = AccountInfoStore::new(accounts);
    let plan = LookupTableLifecycle::new(program_id, &store, &clock).create(
        fixed.owner.key,
        fixed.owner_signed(),
        fixed.metadata.key,
        fixed.native_table.key,
        recent_slot,
        id,
    )?;

    let rent = Rent::from_account_info(fixed.rent_sysvar)?;
    let required_lamports = rent
        .minimum_balance(USER_LOOKUP_TABLE_SIZE)
        .max(1)
        .saturating_sub(fixed.metadata.lamports());

    if required_lamports > 0 {
        invoke(
            &system_instruction::transfer(fixed.owner.key, fixed.metadata.key, required_lamports),
            &[
                fixed.owner.clone(),
                fixed.metadata.clone(),
                fixed.system_program.clone(),
            ],
        )?;
    }

    let id_bytes = id.to_le_bytes();
    let bump_seed = [plan.metadata_bump];
    let signer_seeds = user_lookup_table_signer_seeds(fixed.owner.key, &id_bytes, &bump_seed);

    invoke_signed(
        &system_instruction::allocate(fixed.metadata.key, USER_LOOKUP_TABLE_SIZE as u64),
        &[fixed.metadata.clone(), fixed.system_program.clone()],
        &[&signer_seeds],
    )?;

    invoke_signed(
        &system_instruction::assign(fixed.metadata.key, program_id),
        &[fixed.metadata.clone(), fixed.system_program.clone()],
        &[&signer_seeds],
    )?;

    plan.state()
        .serialize_into(&mut fixed.metadata.try_borrow_mut_data()?)?;

    let (create_instruction, _) = native_instruction::create_lookup_table(
        *fixed.metadata.key,
        *fixed.owner.key,
        recent_slot,
    );
    invoke(
        &create_instruction,
        &[
            fixed.native_table.clone(),
            fixed.metadata.clone(),
            fixed.owner.clone(),
            fixed.system_program.clone(),
            fixed.native_program.clone(),
        ],
    )?;

    msg!("{}", plan.event());
    Ok(())
}

fn process_extend_lookup_table(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let fixed = FixedAccounts::next(account_info_iter)?;
    let candidates: Vec<Pubkey> = account_info_iter.map(|info| *info.key).collect();

    let clock = Clock::get()?;
    let store = AccountInfoStore::new(accounts);
    let plan = LookupTableLifecycle::new(program_id, &store, &clock).extend(
        fixed.owner.key,
        fixed.owner_signed(),
        fixed.metadata.key,
        fixed.native_table.key,
        &candidates,
    )?;

    plan.state()
        .serialize_into(&mut fixed.metadata.try_borrow_mut_data()?)?;

    let id_bytes = plan.table.id.to_le_bytes();
    let bump_seed = [plan.metadata_bump];
    let signer_seeds = user_lookup_table_signer_seeds(fixed.owner.key, &id_bytes, &bump_seed);

    invoke_signed(
        &native_instruction::extend_lookup_table(
            *fixed.native_table.key,
            *fixed.metadata.key,
            Some(*fixed.owner.key),
            plan.new_addresses.clone(),
        ),
        &[
            fixed.native_table.clone(),
            fixed.metadata.clone(),
            fixed.owner.clone(),
            fixed.system_program.clone(),
            fixed.native_program.clone(),
        ],
        &[&signer_seeds],
    )?;

    msg!("{}", plan.event());
    Ok(())
}

fn process_deactivate_lookup_table(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let fixed = FixedAccounts::next(account_info_iter)?;

    let clock = Clock::get()?;
    let store = AccountInfoStore::new(accounts);
    let plan = LookupTableLifecycle::new(program_id, &store, &clock).deactivate(
        fixed.owner.key,
        fixed.owner_signed(),
        fixed.metadata.key,
        fixed.native_table.key,
    )?;

    plan.state()
        .serialize_into(&mut fixed.metadata.try_borrow_mut_data()?)?;

    let id_bytes = plan.table.id.to_le_bytes();
    let bump_seed = [plan.metadata_bump];
    let signer_seeds = user_lookup_table_signer_seeds(fixed.owner.key, &id_bytes, &bump_seed);

    invoke_signed(
        &native_instruction::deactivate_lookup_table(*fixed.native_table.key, *fixed.metadata.key),
        &[
            fixed.native_table.clone(),
            fixed.metadata.clone(),
            fixed.native_program.clone(),
        ],
        &[&signer_seeds],
    )?;

    msg!("{}", plan.event());
    Ok(())
}

fn process_close_lookup_table(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let fixed = FixedAccounts::next(account_info_iter)?;

    let clock = Clock::get()?;
    let store = AccountInfoStore::new(accounts);
    let plan = LookupTableLifecycle::new(program_id, &store, &clock).close(
        fixed.owner.key,
        fixed.owner_signed(),
        fixed.metadata.key,
        fixed.native_table.key,
    )?;

    let id_bytes = plan.table.id.to_le_bytes();
    let bump_seed = [plan.metadata_bump];
    let signer_seeds = user_lookup_table_signer_seeds(fixed.owner.key, &id_bytes, &bump_seed);

    invoke_signed(
        &native_instruction::close_lookup_table(
            *fixed.native_table.key,
            *fixed.metadata.key,
            *fixed.owner.key,
        ),
        &[
            fixed.native_table.clone(),
            fixed.metadata.clone(),
            fixed.owner.clone(),
            fixed.native_program.clone(),
        ],
        &[&signer_seeds],
    )?;

    let metadata_lamports = fixed.metadata.lamports();
    let owner_lamports = fixed
        .owner
        .lamports()
        .checked_add(metadata_lamports)
        .ok_or(ProgramError::ArithmeticOverflow)?;
    **fixed.owner.try_borrow_mut_lamports()? = owner_lamports;
    **fixed.metadata.try_borrow_mut_lamports()? = 0;

    fixed.metadata.realloc(0, true)?;
    fixed.metadata.assign(&system_program::id());

    msg!("{}", plan.event());
    Ok(())
}
