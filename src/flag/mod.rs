//! Transformation du drapeau chiffré
//!
//! L'exécuteur déchiffre son drapeau lorsqu'un `CALL` reçoit le sélecteur
//! 0x42 avec R0 = 0x7A. La clé finale dérive de R0, R1 et du sélecteur;
//! le même XOR chiffre et déchiffre.

/// Constante XOR appliquée à la clé dérivée
pub const FLAG_XOR_KEY: u8 = 0xC7;

/// Graine mélangée aux registres lors de la dérivation
pub const KEY_SEED: u8 = 0xA5;

/// Valeur de R0 attendue par l'exécuteur
pub const UNLOCK_R0: u8 = 0x7A;

/// Sélecteur de `CALL` déclenchant le déchiffrement
pub const UNLOCK_SELECTOR: u8 = 0x42;

/// Drapeau en clair utilisé par défaut par l'outil `flag-enc`
pub const DEFAULT_FLAG: &[u8] = b"DMI{wh4t_4_w31rd_vm}";

/// Paramètres de dérivation de la clé
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagKey {
    pub r0: u8,
    pub r1: u8,
    pub selector: u8,
}

impl FlagKey {
    pub const fn new(r0: u8, r1: u8, selector: u8) -> Self {
        Self { r0, r1, selector }
    }

    /// `((r0 ^ r1 ^ 0xA5) + selector) mod 256`
    pub const fn derived(&self) -> u8 {
        (self.r0 ^ self.r1 ^ KEY_SEED).wrapping_add(self.selector)
    }

    /// Clé appliquée octet par octet
    pub const fn final_key(&self) -> u8 {
        self.derived() ^ FLAG_XOR_KEY
    }

    /// Vrai si l'exécuteur accepterait ces paramètres
    pub const fn unlocks(&self) -> bool {
        self.r0 == UNLOCK_R0 && self.selector == UNLOCK_SELECTOR
    }

    /// XOR de chaque octet avec la clé finale (chiffre ou déchiffre)
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        let key = self.final_key();
        data.iter().map(|b| b ^ key).collect()
    }
}

impl Default for FlagKey {
    fn default() -> Self {
        Self::new(UNLOCK_R0, 0x00, UNLOCK_SELECTOR)
    }
}

/// Chiffre un drapeau; renvoie les octets chiffrés et la clé finale
pub fn encrypt_flag(plain: &[u8], key: &FlagKey) -> (Vec<u8>, u8) {
    (key.apply(plain), key.final_key())
}
