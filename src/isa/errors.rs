//! Erreurs du décodeur de bytecode

use thiserror::Error;

/// Erreurs pouvant survenir lors du décodage
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// L'instruction déclare plus d'octets d'opérande qu'il n'en reste
    #[error(
        "truncated operand at {address:04x}: {mnemonic} (0x{opcode:02x}) needs {needed} operand byte(s), {available} available"
    )]
    TruncatedOperand {
        address: usize,
        opcode: u8,
        mnemonic: &'static str,
        needed: usize,
        available: usize,
    },

    /// Adresse de départ hors du tampon
    #[error("address {address:04x} is outside the {len}-byte input")]
    AddressOutOfRange { address: usize, len: usize },

    /// Deux entrées de la table d'opcodes partagent le même octet
    #[error("duplicate opcode 0x{opcode:02x} in opcode table")]
    DuplicateOpcode { opcode: u8 },
}

impl DecodeError {
    /// Adresse de l'instruction fautive, si l'erreur en a une
    pub fn address(&self) -> Option<usize> {
        match self {
            DecodeError::TruncatedOperand { address, .. }
            | DecodeError::AddressOutOfRange { address, .. } => Some(*address),
            DecodeError::DuplicateOpcode { .. } => None,
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
