//! Jeu d'instructions de la VM mbytev
//!
//! La VM mbytev est une petite machine à pile avec quatre registres 8 bits
//! (R0-R3), un drapeau zéro et un jeu de 11 opcodes à longueur variable.
//! Ce module décode son bytecode brut en une liste d'instructions lisible.

pub mod errors;
pub mod opcodes;
pub mod registers;
pub mod instructions;
pub mod decoder;
pub mod listing;

pub use errors::*;
pub use opcodes::*;
pub use registers::*;
pub use instructions::*;
pub use decoder::*;
pub use listing::*;
