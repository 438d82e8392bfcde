//! mbytev-disasm - Désassembleur du bytecode de la VM mbytev
//!
//! Cette bibliothèque décode un flux d'octets en une liste d'instructions
//! (adresse, mnémonique, opérandes) et fournit le rendu texte, le chargement
//! des fichiers et la transformation du drapeau associée au `CALL 0x42`.

pub mod isa;
pub mod flag;
pub mod program;
pub mod config;

pub use isa::*;
pub use program::*;
pub use config::*;

/// Version du désassembleur
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
