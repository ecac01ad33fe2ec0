//! The in-progress "new account" record and the controller that mutates it.

pub mod controller;
pub mod store;

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct AccountDraft {
    /// Empty until the address generator delivers a candidate.
    pub address: String,
    pub name: String,
    pub network_key: String,
    /// What key derivation consumes: a SURI for Substrate networks, the raw phrase otherwise.
    pub seed: String,
    /// The bare generated phrase, kept for display on the backup step.
    pub seed_phrase: String,
    /// Junctions only when valid; the raw user text when not.
    pub derivation_path: String,
    pub derivation_password: String,
    pub valid_bip39_seed: bool,
    pub is_derivation_path_valid: bool,
}

impl Default for AccountDraft {
    fn default() -> Self {
        Self {
            address: String::new(),
            name: String::new(),
            network_key: String::new(),
            seed: String::new(),
            seed_phrase: String::new(),
            derivation_path: String::new(),
            derivation_password: String::new(),
            valid_bip39_seed: false,
            // No path typed yet, which is a valid path.
            is_derivation_path_valid: true,
        }
    }
}

impl fmt::Debug for AccountDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountDraft")
            .field("address", &self.address)
            .field("name", &self.name)
            .field("network_key", &self.network_key)
            .field("seed", &redacted(&self.seed))
            .field("seed_phrase", &redacted(&self.seed_phrase))
            .field("derivation_path", &self.derivation_path)
            .field("derivation_password", &redacted(&self.derivation_password))
            .field("valid_bip39_seed", &self.valid_bip39_seed)
            .field("is_derivation_path_valid", &self.is_derivation_path_valid)
            .finish()
    }
}

const fn redacted(s: &str) -> &'static str {
    if s.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

/// A partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub address: Option<String>,
    pub name: Option<String>,
    pub network_key: Option<String>,
    pub seed: Option<String>,
    pub seed_phrase: Option<String>,
    pub derivation_path: Option<String>,
    pub derivation_password: Option<String>,
    pub valid_bip39_seed: Option<bool>,
    pub is_derivation_path_valid: Option<bool>,
}

impl DraftPatch {
    /// Clears everything the address generator produced.
    pub fn cleared_seed() -> Self {
        Self {
            address: Some(String::new()),
            seed: Some(String::new()),
            seed_phrase: Some(String::new()),
            valid_bip39_seed: Some(false),
            ..Self::default()
        }
    }
}

impl AccountDraft {
    /// A new snapshot with `patch` applied on top of `self`.
    pub fn patched(&self, patch: DraftPatch) -> Self {
        let DraftPatch {
            address,
            name,
            network_key,
            seed,
            seed_phrase,
            derivation_path,
            derivation_password,
            valid_bip39_seed,
            is_derivation_path_valid,
        } = patch;
        Self {
            address: address.unwrap_or_else(|| self.address.clone()),
            name: name.unwrap_or_else(|| self.name.clone()),
            network_key: network_key.unwrap_or_else(|| self.network_key.clone()),
            seed: seed.unwrap_or_else(|| self.seed.clone()),
            seed_phrase: seed_phrase.unwrap_or_else(|| self.seed_phrase.clone()),
            derivation_path: derivation_path.unwrap_or_else(|| self.derivation_path.clone()),
            derivation_password: derivation_password
                .unwrap_or_else(|| self.derivation_password.clone()),
            valid_bip39_seed: valid_bip39_seed.unwrap_or(self.valid_bip39_seed),
            is_derivation_path_valid: is_derivation_path_valid
                .unwrap_or(self.is_derivation_path_valid),
        }
    }
}
