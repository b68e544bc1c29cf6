//! Records of successful lifecycle transitions.

use {
    solana_program::{clock::Slot, pubkey::Pubkey},
    std::fmt,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LutEvent {
    Created {
        wrapper: Pubkey,
        lut_address: Pubkey,
        authority: Pubkey,
        slot: Slot,
    },
    Extended {
        wrapper: Pubkey,
        addresses_added: u32,
        total_addresses: u32,
    },
    Deactivated {
        wrapper: Pubkey,
        lut_address: Pubkey,
    },
    Closed {
        wrapper: Pubkey,
        lut_address: Pubkey,
    },
}

impl LutEvent {
    pub fn wrapper(&self) -> &Pubkey {
        match self {
            Self::Created { wrapper, .. }
            | Self::Extended { wrapper, .. }
            | Self::Deactivated { wrapper, .. }
            | Self::Closed { wrapper, .. } => wrapper,
        }
    }
}

impl fmt::Display for LutEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created {
                wrapper,
                lut_address,
                authority,
                slot,
            } => write!(
                f,
                "LutCreated wrapper={wrapper} lut={lut_address} authority={authority} slot={slot}"
            ),
            Self::Extended {
                wrapper,
                addresses_added,
                total_addresses,
            } => write!(
                f,
                "LutExtended wrapper={wrapper} added={addresses_added} total={total_addresses}"
            ),
            Self::Deactivated {
                wrapper,
                lut_address,
            } => write!(f, "LutDeactivated wrapper={wrapper} lut={lut_address}"),
            Self::Closed {
                wrapper,
                lut_address,
            } => write!(f, "LutClosed wrapper={wrapper} lut={lut_address}"),
        }
    }
}
