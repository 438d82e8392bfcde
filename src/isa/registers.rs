//! Registres de la VM mbytev

use serde::Serialize;
use std::fmt;

/// Nombre de registres généraux (R0-R3)
pub const REGISTER_COUNT: usize = 4;

const REGISTER_MASK: u8 = (REGISTER_COUNT - 1) as u8;

/// Index de registre architectural
///
/// Les champs d'encodage peuvent être plus larges (un quartet pour les
/// paires), mais seuls les 2 bits de poids faible sélectionnent le registre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Register(u8);

impl Register {
    pub const R0: Register = Register(0);
    pub const R1: Register = Register(1);
    pub const R2: Register = Register(2);
    pub const R3: Register = Register(3);

    /// Construit un registre depuis un champ brut, masqué sur 2 bits
    pub const fn from_raw(raw: u8) -> Self {
        Register(raw & REGISTER_MASK)
    }

    /// Sépare un octet compacté en (destination, source)
    pub const fn unpack_pair(packed: u8) -> (Register, Register) {
        (Self::from_raw(packed >> 4), Self::from_raw(packed & 0x0F))
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}
