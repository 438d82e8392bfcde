//! Instructions de la VM mbytev

use super::registers::Register;
use crate::flag::UNLOCK_SELECTOR;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Instruction décodée, un variant par classe d'opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instruction {
    Nop,
    PushImm { imm: i8 },
    PopReg { reg: Register },
    MovRR { dst: Register, src: Register },
    AddRR { dst: Register, src: Register },
    SubRR { dst: Register, src: Register },
    CmpRegImm { reg: Register, imm: i8 },
    Jz { disp: i16 },
    Jmp { disp: i16 },
    /// Le sens du sélecteur appartient à l'exécuteur
    Call { selector: u8 },
    Halt,

    /// Octet hors table, rendu tel quel sur un octet
    RawByte { byte: u8 },
}

/// Valeur d'opérande décodée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Operand {
    Register(Register),
    Immediate(i8),
    Displacement(i16),
    Selector(u8),
    Byte(u8),
}

impl Instruction {
    /// Opérandes dans l'ordre d'encodage
    pub fn operands(&self) -> Vec<Operand> {
        match *self {
            Instruction::Nop | Instruction::Halt => Vec::new(),
            Instruction::PushImm { imm } => vec![Operand::Immediate(imm)],
            Instruction::PopReg { reg } => vec![Operand::Register(reg)],
            Instruction::MovRR { dst, src }
            | Instruction::AddRR { dst, src }
            | Instruction::SubRR { dst, src } => {
                vec![Operand::Register(dst), Operand::Register(src)]
            }
            Instruction::CmpRegImm { reg, imm } => {
                vec![Operand::Register(reg), Operand::Immediate(imm)]
            }
            Instruction::Jz { disp } | Instruction::Jmp { disp } => {
                vec![Operand::Displacement(disp)]
            }
            Instruction::Call { selector } => vec![Operand::Selector(selector)],
            Instruction::RawByte { byte } => vec![Operand::Byte(byte)],
        }
    }

    /// Déplacement relatif des sauts
    pub fn displacement(&self) -> Option<i16> {
        match *self {
            Instruction::Jz { disp } | Instruction::Jmp { disp } => Some(disp),
            _ => None,
        }
    }

    /// `CALL 0x42` déclenche le déchiffrement du drapeau dans l'exécuteur
    pub fn is_flag_unlock(&self) -> bool {
        matches!(self, Instruction::Call { selector } if *selector == UNLOCK_SELECTOR)
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Instruction::RawByte { .. })
    }
}

/// Instruction décodée avec sa position dans le flux
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedInstruction {
    /// Décalage de l'octet d'opcode dans l'entrée
    pub address: usize,

    /// Longueur encodée totale (opcode + opérandes)
    pub size: usize,

    pub opcode: u8,

    /// Nom de la table, ou `DB_0xhh` pour un octet inconnu
    pub mnemonic: Cow<'static, str>,

    pub instruction: Instruction,
}

impl DecodedInstruction {
    pub fn new(address: usize, size: usize, opcode: u8, mnemonic: Cow<'static, str>, instruction: Instruction) -> Self {
        Self {
            address,
            size,
            opcode,
            mnemonic,
            instruction,
        }
    }

    /// Enregistrement de repli pour un octet hors table
    pub fn raw(address: usize, byte: u8) -> Self {
        Self::new(
            address,
            1,
            byte,
            Cow::Owned(format!("DB_0x{:02x}", byte)),
            Instruction::RawByte { byte },
        )
    }

    /// Adresse de l'octet suivant l'instruction
    pub fn end(&self) -> usize {
        self.address + self.size
    }

    /// Cible d'un saut: fin de l'instruction + déplacement.
    /// Peut sortir du programme; c'est à l'appelant d'en juger.
    pub fn jump_target(&self) -> Option<i64> {
        self.instruction
            .displacement()
            .map(|disp| self.end() as i64 + disp as i64)
    }

    pub fn operands(&self) -> Vec<Operand> {
        self.instruction.operands()
    }

    /// Octets bruts de l'instruction dans le tampon d'origine
    pub fn bytes<'a>(&self, input: &'a [u8]) -> Option<&'a [u8]> {
        input.get(self.address..self.end())
    }

    /// Texte de l'instruction sans l'adresse (`MNEMONIC operandes`)
    pub fn assembly(&self) -> String {
        let mut out = String::new();
        // L'écriture dans une String ne peut pas échouer
        let _ = self.write_assembly(&mut out);
        out
    }

    fn write_assembly(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self.instruction {
            Instruction::Nop | Instruction::Halt => write!(f, "{}", self.mnemonic),
            Instruction::PushImm { imm } => write!(f, "{} {}", self.mnemonic, imm),
            Instruction::PopReg { reg } => write!(f, "{} {}", self.mnemonic, reg),
            Instruction::MovRR { dst, src }
            | Instruction::AddRR { dst, src }
            | Instruction::SubRR { dst, src } => write!(f, "{} {},{}", self.mnemonic, dst, src),
            Instruction::CmpRegImm { reg, imm } => write!(f, "{} {}, {}", self.mnemonic, reg, imm),
            Instruction::Jz { disp } | Instruction::Jmp { disp } => {
                write!(f, "{} {:+}", self.mnemonic, disp)
            }
            Instruction::Call { selector } => write!(f, "{} 0x{:02x}", self.mnemonic, selector),
            Instruction::RawByte { byte } => write!(f, "DB 0x{:02x}", byte),
        }
    }
}

/// Ligne de listing: `AAAA: MNEMONIC operandes`
impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}: ", self.address)?;
        self.write_assembly(f)
    }
}
