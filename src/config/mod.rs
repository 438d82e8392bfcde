//! Configuration du désassembleur

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::program::MAX_CODE;

/// Configuration principale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisasmConfig {
    pub listing: ListingConfig,
    pub loader: LoaderConfig,
}

/// Options de rendu du listing
///
/// Toutes désactivées par défaut: le listing reste alors ligne pour ligne
/// identique au format `AAAA: MNEMONIC operandes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Colonne d'octets bruts après l'adresse
    pub show_bytes: bool,
    /// Commentaire avec la cible absolue des sauts
    pub annotate_targets: bool,
    /// Commentaire sur `CALL 0x42`
    pub annotate_flag_unlock: bool,
    /// En-tête avec nom, taille et empreintes du programme
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Taille lue par la VM; au-delà un avertissement est émis
    pub max_code_size: usize,
    /// Tronque l'entrée à `max_code_size` comme le fait la VM
    pub truncate_to_vm_limit: bool,
    /// Le fichier est un programme empaqueté (XOR avec la clé d'empaquetage)
    pub unpack: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_code_size: MAX_CODE,
            truncate_to_vm_limit: false,
            unpack: false,
        }
    }
}

impl DisasmConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("cannot read config '{}'", path.display()))?;
        let config: DisasmConfig = toml::from_str(&contents)
            .with_context(|| format!("invalid config '{}'", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("{:#}; using default configuration", err);
                Self::default()
            }
        }
    }
}
