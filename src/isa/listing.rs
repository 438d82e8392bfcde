//! Rendu texte des programmes décodés

use super::instructions::DecodedInstruction;
use crate::config::ListingConfig;
use crate::program::Program;
use std::fmt::Write;

/// Largeur de la colonne d'octets bruts (3 octets au plus)
const BYTES_COLUMN_WIDTH: usize = 8;

/// Formateur de listing
#[derive(Debug, Clone, Default)]
pub struct ListingFormatter {
    config: ListingConfig,
}

impl ListingFormatter {
    pub fn new(config: ListingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ListingConfig {
        &self.config
    }

    /// Rend une ligne; `input` est le tampon décodé en entier
    pub fn render_line(&self, decoded: &DecodedInstruction, input: &[u8]) -> String {
        let mut line = format!("{:04x}: ", decoded.address);

        if self.config.show_bytes {
            let hex = decoded
                .bytes(input)
                .unwrap_or_default()
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(line, "{:<width$}  ", hex, width = BYTES_COLUMN_WIDTH);
        }

        line.push_str(&decoded.assembly());

        if self.config.annotate_targets {
            if let Some(target) = decoded.jump_target() {
                // La VM accepte une cible égale à la longueur (arrêt propre)
                if target >= 0 && target as usize <= input.len() {
                    let _ = write!(line, "  ; -> 0x{:04x}", target);
                } else {
                    let _ = write!(line, "  ; -> out of bounds ({})", target);
                }
            }
        }

        if self.config.annotate_flag_unlock && decoded.instruction.is_flag_unlock() {
            line.push_str("  ; flag unlock");
        }

        line
    }

    /// Rend toutes les instructions, une par ligne
    pub fn render(&self, decoded: &[DecodedInstruction], input: &[u8]) -> String {
        let mut out = String::new();
        for instruction in decoded {
            out.push_str(&self.render_line(instruction, input));
            out.push('\n');
        }
        out
    }

    /// En-tête commenté décrivant le programme
    pub fn render_header(&self, program: &Program) -> String {
        format!(
            "; {}\n; size: {} bytes\n; crc32: {:#010x}\n; sha256: {}\n",
            program.name(),
            program.size(),
            program.crc32(),
            program.sha256()
        )
    }

    /// Listing complet d'un programme, en-tête compris si demandé
    pub fn render_program(&self, program: &Program, decoded: &[DecodedInstruction]) -> String {
        let mut out = String::new();
        if self.config.header {
            out.push_str(&self.render_header(program));
        }
        out.push_str(&self.render(decoded, program.data()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::decoder::decode;

    #[test]
    fn default_render_is_plain_listing() {
        let input = [0x01, 0x05, 0xF9];
        let decoded = decode(&input).unwrap();
        let listing = ListingFormatter::default().render(&decoded, &input);
        assert_eq!(listing, "0000: PUSH_IMM 5\n0002: HALT\n");
    }

    #[test]
    fn bytes_column_is_padded() {
        let input = [0x07, 0xFE, 0xFF, 0x00];
        let decoded = decode(&input).unwrap();
        let formatter = ListingFormatter::new(ListingConfig {
            show_bytes: true,
            ..ListingConfig::default()
        });
        assert_eq!(formatter.render_line(&decoded[0], &input), "0000: 07 fe ff  JZ -2");
        assert_eq!(formatter.render_line(&decoded[1], &input), "0003: 00        NOP");
    }

    #[test]
    fn target_annotation_checks_bounds() {
        // JZ -2 retombe sur l'octet 1; JMP +5 sort du programme
        let input = [0x07, 0xFE, 0xFF, 0x08, 0x05, 0x00];
        let decoded = decode(&input).unwrap();
        let formatter = ListingFormatter::new(ListingConfig {
            annotate_targets: true,
            ..ListingConfig::default()
        });
        assert_eq!(formatter.render_line(&decoded[0], &input), "0000: JZ -2  ; -> 0x0001");
        assert_eq!(
            formatter.render_line(&decoded[1], &input),
            "0003: JMP +5  ; -> out of bounds (11)"
        );
    }

    #[test]
    fn target_equal_to_length_is_in_bounds() {
        let input = [0x08, 0x00, 0x00];
        let decoded = decode(&input).unwrap();
        let formatter = ListingFormatter::new(ListingConfig {
            annotate_targets: true,
            ..ListingConfig::default()
        });
        assert_eq!(formatter.render_line(&decoded[0], &input), "0000: JMP +0  ; -> 0x0003");
    }

    #[test]
    fn flag_unlock_annotation() {
        let input = [0x09, 0x42, 0x09, 0x41];
        let decoded = decode(&input).unwrap();
        let formatter = ListingFormatter::new(ListingConfig {
            annotate_flag_unlock: true,
            ..ListingConfig::default()
        });
        assert_eq!(
            formatter.render(&decoded, &input),
            "0000: CALL 0x42  ; flag unlock\n0002: CALL 0x41\n"
        );
    }

    #[test]
    fn header_lists_fingerprints() {
        let program = Program::from_bytes("prog.bin", vec![0xF9]);
        let formatter = ListingFormatter::new(ListingConfig {
            header: true,
            ..ListingConfig::default()
        });
        let decoded = decode(program.data()).unwrap();
        let listing = formatter.render_program(&program, &decoded);
        assert!(listing.starts_with("; prog.bin\n; size: 1 bytes\n; crc32: 0x"));
        assert!(listing.ends_with("0000: HALT\n"));
    }
}
