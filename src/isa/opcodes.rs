//! Table des opcodes de la VM mbytev
//!
//! La table associe un octet d'opcode à un mnémonique, un nombre nominal
//! d'octets d'opérande et une classe d'instruction. C'est la classe (et son
//! format d'opérandes) qui fait foi pour le décodage ; le nombre nominal
//! n'est qu'une indication.

use super::errors::{DecodeError, DecodeResult};

/// Classes d'instructions connues de la VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeKind {
    Nop,
    PushImm,
    PopReg,
    MovRR,
    AddRR,
    SubRR,
    CmpRegImm,
    Jz,
    Jmp,
    Call,
    Halt,
}

/// Formats d'opérandes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandLayout {
    /// Aucun opérande
    None,
    /// Un immédiat signé 8 bits
    SignedImm8,
    /// Un index de registre (2 bits de poids faible)
    Register,
    /// Un octet compacté: quartet haut = destination, quartet bas = source
    RegisterPair,
    /// Un index de registre puis un immédiat signé 8 bits
    RegisterImm8,
    /// Déplacement relatif signé 16 bits, petit-boutiste
    Rel16,
    /// Sélecteur non signé 8 bits (table d'appels de l'exécuteur)
    Selector8,
}

impl OperandLayout {
    /// Nombre d'octets d'opérande consommés
    pub const fn width(self) -> usize {
        match self {
            OperandLayout::None => 0,
            OperandLayout::SignedImm8
            | OperandLayout::Register
            | OperandLayout::RegisterPair
            | OperandLayout::Selector8 => 1,
            OperandLayout::RegisterImm8 | OperandLayout::Rel16 => 2,
        }
    }
}

impl OpcodeKind {
    /// Format d'opérandes propre à la classe
    pub const fn operand_layout(self) -> OperandLayout {
        match self {
            OpcodeKind::Nop | OpcodeKind::Halt => OperandLayout::None,
            OpcodeKind::PushImm => OperandLayout::SignedImm8,
            OpcodeKind::PopReg => OperandLayout::Register,
            OpcodeKind::MovRR | OpcodeKind::AddRR | OpcodeKind::SubRR => {
                OperandLayout::RegisterPair
            }
            OpcodeKind::CmpRegImm => OperandLayout::RegisterImm8,
            OpcodeKind::Jz | OpcodeKind::Jmp => OperandLayout::Rel16,
            OpcodeKind::Call => OperandLayout::Selector8,
        }
    }
}

/// Entrée de la table d'opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub opcode: u8,
    pub mnemonic: &'static str,
    /// Nombre nominal d'octets d'opérande
    pub operand_bytes: u8,
    pub kind: OpcodeKind,
}

impl OpcodeEntry {
    pub const fn new(opcode: u8, mnemonic: &'static str, operand_bytes: u8, kind: OpcodeKind) -> Self {
        Self {
            opcode,
            mnemonic,
            operand_bytes,
            kind,
        }
    }

    /// Longueur totale encodée (opcode compris)
    pub const fn encoded_len(&self) -> usize {
        1 + self.kind.operand_layout().width()
    }
}

pub const OP_NOP: u8 = 0x00;
pub const OP_PUSH_IMM: u8 = 0x01;
pub const OP_POP_REG: u8 = 0x02;
pub const OP_MOV_RR: u8 = 0x03;
pub const OP_ADD_RR: u8 = 0x04;
pub const OP_SUB_RR: u8 = 0x05;
pub const OP_CMP_REG_IMM: u8 = 0x06;
pub const OP_JZ: u8 = 0x07;
pub const OP_JMP: u8 = 0x08;
pub const OP_CALL: u8 = 0x09;
pub const OP_HALT: u8 = 0xF9;

/// Table standard de la VM. Tout octet absent est rendu en `DB_0xHH`.
pub const STANDARD_OPCODES: &[OpcodeEntry] = &[
    OpcodeEntry::new(OP_NOP, "NOP", 0, OpcodeKind::Nop),
    OpcodeEntry::new(OP_PUSH_IMM, "PUSH_IMM", 1, OpcodeKind::PushImm),
    OpcodeEntry::new(OP_POP_REG, "POP_REG", 1, OpcodeKind::PopReg),
    OpcodeEntry::new(OP_MOV_RR, "MOV_RR", 1, OpcodeKind::MovRR),
    OpcodeEntry::new(OP_ADD_RR, "ADD_RR", 1, OpcodeKind::AddRR),
    OpcodeEntry::new(OP_SUB_RR, "SUB_RR", 1, OpcodeKind::SubRR),
    OpcodeEntry::new(OP_CMP_REG_IMM, "CMP_REG_IMM", 2, OpcodeKind::CmpRegImm),
    OpcodeEntry::new(OP_JZ, "JZ", 2, OpcodeKind::Jz),
    OpcodeEntry::new(OP_JMP, "JMP", 2, OpcodeKind::Jmp),
    OpcodeEntry::new(OP_CALL, "CALL", 1, OpcodeKind::Call),
    OpcodeEntry::new(OP_HALT, "HALT", 0, OpcodeKind::Halt),
];

/// Table d'opcodes immuable, injectée dans le décodeur
#[derive(Debug, Clone, Copy)]
pub struct OpcodeTable<'t> {
    entries: &'t [OpcodeEntry],
}

impl OpcodeTable<'static> {
    /// Table standard de la VM mbytev
    pub const fn standard() -> Self {
        Self {
            entries: STANDARD_OPCODES,
        }
    }
}

impl<'t> OpcodeTable<'t> {
    /// Construit une table à partir d'entrées fournies par l'appelant
    pub fn new(entries: &'t [OpcodeEntry]) -> DecodeResult<Self> {
        let mut seen = [false; 256];
        for entry in entries {
            let slot = &mut seen[entry.opcode as usize];
            if *slot {
                return Err(DecodeError::DuplicateOpcode {
                    opcode: entry.opcode,
                });
            }
            *slot = true;

            if entry.operand_bytes as usize != entry.kind.operand_layout().width() {
                log::debug!(
                    "opcode 0x{:02x} ({}): nominal operand count {} differs from layout width {}",
                    entry.opcode,
                    entry.mnemonic,
                    entry.operand_bytes,
                    entry.kind.operand_layout().width()
                );
            }
        }
        Ok(Self { entries })
    }

    /// Recherche l'entrée associée à un octet d'opcode
    pub fn lookup(&self, opcode: u8) -> Option<&'t OpcodeEntry> {
        self.entries.iter().find(|entry| entry.opcode == opcode)
    }

    pub fn entries(&self) -> &'t [OpcodeEntry] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OpcodeTable<'static> {
    fn default() -> Self {
        Self::standard()
    }
}
