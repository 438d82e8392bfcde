//! Programmes de bytecode mbytev
//!
//! Le format n'a ni en-tête, ni nombre magique, ni préfixe de longueur:
//! un programme est une simple suite d'octets.

pub mod loader;

pub use loader::*;

use crc32fast::Hasher;
use sha2::{Digest, Sha256};

/// Nombre maximal d'octets lus par la VM
pub const MAX_CODE: usize = 4096;

/// Clé XOR du programme embarqué de la VM: `((0x12 ^ 0xB5) + 0x11) & 0xFF`
pub const PACK_KEY: u8 = (0x12u8 ^ 0xB5).wrapping_add(0x11);

/// Programme chargé en mémoire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    name: String,
    data: Vec<u8>,
}

impl Program {
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// CRC32 du contenu
    pub fn crc32(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&self.data);
        hasher.finalize()
    }

    /// SHA-256 du contenu, en hexadécimal minuscule
    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.data);
        format!("{:x}", hasher.finalize())
    }
}

/// Désempaquette un programme embarqué
pub fn unpack(packed: &[u8]) -> Vec<u8> {
    packed.iter().map(|b| b ^ PACK_KEY).collect()
}

/// Empaquette un programme (opération inverse de [`unpack`])
pub fn pack(plain: &[u8]) -> Vec<u8> {
    unpack(plain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_key_value() {
        assert_eq!(PACK_KEY, 0xB8);
    }

    #[test]
    fn pack_round_trip() {
        let plain = [0x01, 0x7A, 0x02, 0x00, 0x09, 0x42, 0xF9];
        let packed = pack(&plain);
        assert_eq!(packed[0], 0x01 ^ 0xB8);
        assert_eq!(unpack(&packed), plain);
    }

    #[test]
    fn fingerprints_of_empty_program() {
        let program = Program::from_bytes("empty", Vec::new());
        assert_eq!(program.crc32(), 0);
        assert_eq!(
            program.sha256(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
