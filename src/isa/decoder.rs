//! Décodeur de bytecode mbytev
//!
//! Le décodage est un parcours linéaire: chaque itération lit un octet
//! d'opcode, consomme les opérandes exigés par la classe de l'opcode et
//! produit une instruction dont l'adresse est la position de l'opcode.
//! Les instructions sont contiguës et couvrent exactement l'entrée.

use super::errors::{DecodeError, DecodeResult};
use super::instructions::{DecodedInstruction, Instruction};
use super::opcodes::{OpcodeEntry, OpcodeKind, OpcodeTable};
use super::registers::Register;
use std::borrow::Cow;

/// Décodeur sans état, paramétré par une table d'opcodes
#[derive(Debug, Clone, Copy)]
pub struct BytecodeDecoder<'t> {
    table: OpcodeTable<'t>,
}

impl BytecodeDecoder<'static> {
    /// Décodeur utilisant la table standard de la VM
    pub const fn new() -> Self {
        Self {
            table: OpcodeTable::standard(),
        }
    }
}

impl Default for BytecodeDecoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> BytecodeDecoder<'t> {
    pub fn with_table(table: OpcodeTable<'t>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &OpcodeTable<'t> {
        &self.table
    }

    /// Décode tout le tampon
    ///
    /// Échoue sur la première instruction dont les opérandes dépassent la
    /// fin du tampon. Un tampon vide donne une liste vide.
    pub fn decode(&self, bytes: &[u8]) -> DecodeResult<Vec<DecodedInstruction>> {
        self.iter(bytes).collect()
    }

    /// Décode l'instruction unique débutant à `address`
    pub fn decode_at(&self, bytes: &[u8], address: usize) -> DecodeResult<DecodedInstruction> {
        let opcode = *bytes.get(address).ok_or(DecodeError::AddressOutOfRange {
            address,
            len: bytes.len(),
        })?;
        let entry = match self.table.lookup(opcode) {
            Some(entry) => entry,
            None => return Ok(DecodedInstruction::raw(address, opcode)),
        };

        let operands = self.read_operands(bytes, address, entry)?;
        let instruction = Self::decode_kind(entry.kind, operands);
        let size = 1 + operands.len();

        Ok(DecodedInstruction::new(
            address,
            size,
            opcode,
            Cow::Borrowed(entry.mnemonic),
            instruction,
        ))
    }

    /// Itère sur les instructions; s'arrête après la première erreur
    pub fn iter<'a>(&self, bytes: &'a [u8]) -> DecodeIter<'a, 't> {
        DecodeIter {
            decoder: *self,
            bytes,
            cursor: 0,
            failed: false,
        }
    }

    /// Extrait les octets d'opérande selon le format de la classe
    fn read_operands<'a>(
        &self,
        bytes: &'a [u8],
        address: usize,
        entry: &OpcodeEntry,
    ) -> DecodeResult<&'a [u8]> {
        let needed = entry.kind.operand_layout().width();
        let start = address + 1;
        let available = bytes.len() - start;

        if available < needed {
            return Err(DecodeError::TruncatedOperand {
                address,
                opcode: entry.opcode,
                mnemonic: entry.mnemonic,
                needed,
                available,
            });
        }

        Ok(&bytes[start..start + needed])
    }

    /// Construit l'instruction à partir des octets d'opérande déjà bornés
    fn decode_kind(kind: OpcodeKind, operands: &[u8]) -> Instruction {
        match kind {
            OpcodeKind::Nop => Instruction::Nop,
            OpcodeKind::Halt => Instruction::Halt,
            OpcodeKind::PushImm => Instruction::PushImm {
                imm: read_s8(operands[0]),
            },
            OpcodeKind::PopReg => Instruction::PopReg {
                reg: Register::from_raw(operands[0]),
            },
            OpcodeKind::MovRR => {
                let (dst, src) = Register::unpack_pair(operands[0]);
                Instruction::MovRR { dst, src }
            }
            OpcodeKind::AddRR => {
                let (dst, src) = Register::unpack_pair(operands[0]);
                Instruction::AddRR { dst, src }
            }
            OpcodeKind::SubRR => {
                let (dst, src) = Register::unpack_pair(operands[0]);
                Instruction::SubRR { dst, src }
            }
            OpcodeKind::CmpRegImm => Instruction::CmpRegImm {
                reg: Register::from_raw(operands[0]),
                imm: read_s8(operands[1]),
            },
            OpcodeKind::Jz => Instruction::Jz {
                disp: read_s16_le(operands[0], operands[1]),
            },
            OpcodeKind::Jmp => Instruction::Jmp {
                disp: read_s16_le(operands[0], operands[1]),
            },
            OpcodeKind::Call => Instruction::Call {
                selector: operands[0],
            },
        }
    }
}

/// Immédiat signé 8 bits en complément à deux (0x80..=0xFF négatifs)
pub fn read_s8(raw: u8) -> i8 {
    raw as i8
}

/// Déplacement signé 16 bits, petit-boutiste
pub fn read_s16_le(lo: u8, hi: u8) -> i16 {
    i16::from_le_bytes([lo, hi])
}

/// Décode un tampon avec la table standard
pub fn decode(bytes: &[u8]) -> DecodeResult<Vec<DecodedInstruction>> {
    BytecodeDecoder::new().decode(bytes)
}

/// Itérateur de décodage, curseur strictement croissant
#[derive(Debug, Clone)]
pub struct DecodeIter<'a, 't> {
    decoder: BytecodeDecoder<'t>,
    bytes: &'a [u8],
    cursor: usize,
    failed: bool,
}

impl<'a, 't> DecodeIter<'a, 't> {
    /// Position du prochain octet d'opcode
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<'a, 't> Iterator for DecodeIter<'a, 't> {
    type Item = DecodeResult<DecodedInstruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.bytes.len() {
            return None;
        }

        match self.decoder.decode_at(self.bytes, self.cursor) {
            Ok(decoded) => {
                log::trace!("{}", decoded);
                self.cursor = decoded.end();
                Some(Ok(decoded))
            }
            Err(err) => {
                log::debug!("decode stopped: {}", err);
                self.failed = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            let remaining = self.bytes.len().saturating_sub(self.cursor);
            ((remaining + 2) / 3, Some(remaining))
        }
    }
}

impl std::iter::FusedIterator for DecodeIter<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::opcodes::{OpcodeEntry, OP_CALL};

    #[test]
    fn signed_byte_boundaries() {
        assert_eq!(read_s8(0x00), 0);
        assert_eq!(read_s8(0x7F), 127);
        assert_eq!(read_s8(0x80), -128);
        assert_eq!(read_s8(0xFF), -1);
    }

    #[test]
    fn signed_word_boundaries() {
        assert_eq!(read_s16_le(0x00, 0x80), -32768);
        assert_eq!(read_s16_le(0xFF, 0x7F), 32767);
        assert_eq!(read_s16_le(0xFE, 0xFF), -2);
    }

    #[test]
    fn decode_at_reports_truncation_with_context() {
        let decoder = BytecodeDecoder::new();
        let err = decoder.decode_at(&[0x00, 0x07, 0x01], 1).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedOperand {
                address: 1,
                opcode: 0x07,
                mnemonic: "JZ",
                needed: 2,
                available: 1,
            }
        );
        assert_eq!(err.to_string(), "truncated operand at 0001: JZ (0x07) needs 2 operand byte(s), 1 available");
    }

    #[test]
    fn decode_at_past_the_end_is_an_error() {
        let decoder = BytecodeDecoder::new();
        let err = decoder.decode_at(&[0x00], 1).unwrap_err();
        assert_eq!(err, DecodeError::AddressOutOfRange { address: 1, len: 1 });
    }

    #[test]
    fn iterator_stops_after_error() {
        let decoder = BytecodeDecoder::new();
        let mut iter = decoder.iter(&[0x00, 0x01]);
        assert!(matches!(iter.next(), Some(Ok(_))));
        assert!(matches!(iter.next(), Some(Err(_))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn injected_table_changes_the_mapping() {
        // Variante où CALL est déplacé sur 0x0A et 0x09 n'est plus connu
        static ENTRIES: [OpcodeEntry; 1] = [OpcodeEntry::new(0x0A, "CALL", 1, OpcodeKind::Call)];
        let table = OpcodeTable::new(&ENTRIES).unwrap();
        let decoder = BytecodeDecoder::with_table(table);

        let decoded = decoder.decode(&[OP_CALL, 0x0A, 0x42]).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].to_string(), "0000: DB 0x09");
        assert_eq!(decoded[1].to_string(), "0001: CALL 0x42");
    }

    #[test]
    fn layout_width_wins_over_nominal_count() {
        // Nombre nominal faux (2) pour CALL: le format 8 bits fait foi
        static ENTRIES: [OpcodeEntry; 1] = [OpcodeEntry::new(0x09, "CALL", 2, OpcodeKind::Call)];
        let decoder = BytecodeDecoder::with_table(OpcodeTable::new(&ENTRIES).unwrap());

        let decoded = decoder.decode(&[0x09, 0x42, 0x09, 0x01]).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1].address, 2);
    }
}
