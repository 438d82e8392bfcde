//! Chargement des fichiers de bytecode

use super::{unpack, Program};
use crate::config::LoaderConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Chargeur de programmes
#[derive(Debug, Clone, Default)]
pub struct ProgramLoader {
    config: LoaderConfig,
}

impl ProgramLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Charge un programme depuis un fichier
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Program> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("could not open '{}'", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(self.load_bytes(name, data))
    }

    /// Applique les options de chargement à des octets déjà lus
    pub fn load_bytes(&self, name: impl Into<String>, mut data: Vec<u8>) -> Program {
        let name = name.into();

        if data.is_empty() {
            log::info!("'{}' is empty", name);
        }

        if self.config.unpack {
            data = unpack(&data);
            log::debug!("unpacked {} byte(s) of '{}'", data.len(), name);
        }

        let limit = self.config.max_code_size;
        if data.len() > limit {
            if self.config.truncate_to_vm_limit {
                log::warn!(
                    "'{}' is {} bytes; truncating to the {}-byte VM limit",
                    name,
                    data.len(),
                    limit
                );
                data.truncate(limit);
            } else {
                log::warn!(
                    "'{}' is {} bytes; the VM only reads the first {}",
                    name,
                    data.len(),
                    limit
                );
            }
        }

        Program::from_bytes(name, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_only_when_asked() {
        let data = vec![0u8; 10];

        let keep = ProgramLoader::new(LoaderConfig {
            max_code_size: 4,
            ..LoaderConfig::default()
        });
        assert_eq!(keep.load_bytes("p", data.clone()).size(), 10);

        let cut = ProgramLoader::new(LoaderConfig {
            max_code_size: 4,
            truncate_to_vm_limit: true,
            unpack: false,
        });
        assert_eq!(cut.load_bytes("p", data).size(), 4);
    }

    #[test]
    fn unpack_is_applied_before_truncation() {
        let loader = ProgramLoader::new(LoaderConfig {
            max_code_size: 1,
            truncate_to_vm_limit: true,
            unpack: true,
        });
        let program = loader.load_bytes("p", vec![0xB8 ^ 0xF9, 0xB8]);
        assert_eq!(program.data(), &[0xF9]);
    }
}
