//! Address/icon generator seam.
//!
//! The draft controller only consumes the `(address, is_bip39, seed)` triple. The generator that
//! ships with the CLI produces preview identifiers from a hash of the seed material; it does not
//! perform key derivation.

use crate::network::{NetworkProtocol, NetworkSpec};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use zeroize::Zeroizing;

/// The derivation path and password a generation result was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStamp {
    pub derivation_path: String,
    pub derivation_password: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAccount {
    pub new_address: String,
    pub is_bip39: bool,
    pub new_seed: String,
    /// When present, the controller drops the result if the draft's path has moved on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_with: Option<PathStamp>,
}

impl std::fmt::Debug for GeneratedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedAccount")
            .field("new_address", &self.new_address)
            .field("is_bip39", &self.is_bip39)
            .field("requested_with", &self.requested_with)
            .finish_non_exhaustive()
    }
}

impl GeneratedAccount {
    /// The result a generator reports when the user cleared the address field.
    pub fn cleared() -> Self {
        Self {
            new_address: String::new(),
            is_bip39: false,
            new_seed: String::new(),
            requested_with: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub network: &'a NetworkSpec,
    pub derivation_path: &'a str,
    pub derivation_password: &'a str,
    /// Re-derive for this phrase instead of generating a new one.
    pub reuse_phrase: Option<&'a str>,
}

impl GenerationRequest<'_> {
    pub fn stamp(&self) -> PathStamp {
        PathStamp {
            derivation_path: self.derivation_path.to_owned(),
            derivation_password: self.derivation_password.to_owned(),
        }
    }
}

pub trait AddressGenerator {
    fn generate(&mut self, req: &GenerationRequest<'_>) -> eyre::Result<GeneratedAccount>;
}

/// Generates BIP-39 mnemonics and hash-based preview addresses.
#[derive(Debug, Clone)]
pub struct PreviewGenerator {
    word_count: usize,
}

impl PreviewGenerator {
    pub const fn new(word_count: usize) -> Self {
        Self { word_count }
    }
}

fn preview_address(req: &GenerationRequest<'_>, phrase: &str) -> String {
    let mut h = Sha256::new();
    for part in [
        req.network.key.as_str(),
        phrase,
        req.derivation_path,
        req.derivation_password,
    ] {
        h.update(part.as_bytes());
        h.update([0_u8]);
    }
    let digest = h.finalize();

    match req.network.protocol {
        NetworkProtocol::Substrate => {
            let prefix = req.network.prefix.unwrap_or(42).to_be_bytes();
            let mut raw = Vec::with_capacity(prefix.len().saturating_add(digest.len()));
            raw.extend_from_slice(&prefix);
            raw.extend_from_slice(&digest);
            bs58::encode(raw).into_string()
        }
        NetworkProtocol::Ethereum => {
            let tail: Vec<u8> = digest.iter().skip(12).copied().collect();
            format!("0x{}", hex::encode(tail))
        }
    }
}

impl AddressGenerator for PreviewGenerator {
    fn generate(&mut self, req: &GenerationRequest<'_>) -> eyre::Result<GeneratedAccount> {
        let phrase = match req.reuse_phrase {
            Some(p) => Zeroizing::new(p.to_owned()),
            None => Zeroizing::new(crate::seed::generate_mnemonic(self.word_count)?),
        };
        let is_bip39 = crate::seed::validate_seed(&phrase, true).valid;
        Ok(GeneratedAccount {
            new_address: preview_address(req, &phrase),
            is_bip39,
            new_seed: phrase.to_string(),
            requested_with: Some(req.stamp()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkRegistry;

    #[test]
    fn fresh_generation_yields_checked_mnemonic() -> eyre::Result<()> {
        let reg = NetworkRegistry::builtin();
        let mut g = PreviewGenerator::new(12);
        let req = GenerationRequest {
            network: reg.lookup("polkadot")?,
            derivation_path: "//polkadot",
            derivation_password: "",
            reuse_phrase: None,
        };
        let out = g.generate(&req)?;
        assert!(out.is_bip39);
        assert_eq!(out.new_seed.split(' ').count(), 12);
        assert!(!out.new_address.is_empty());
        assert_eq!(out.requested_with, Some(req.stamp()));
        Ok(())
    }

    #[test]
    fn preview_depends_on_path_and_protocol() -> eyre::Result<()> {
        let reg = NetworkRegistry::builtin();
        let phrase = "bottom drive obey lake curtain smoke basket hold race lonely fit walk";
        let mut g = PreviewGenerator::new(24);
        let dot = reg.lookup("polkadot")?;
        let a = g.generate(&GenerationRequest {
            network: dot,
            derivation_path: "//1",
            derivation_password: "",
            reuse_phrase: Some(phrase),
        })?;
        let b = g.generate(&GenerationRequest {
            network: dot,
            derivation_path: "//2",
            derivation_password: "",
            reuse_phrase: Some(phrase),
        })?;
        assert_ne!(a.new_address, b.new_address);
        assert_eq!(a.new_seed, phrase);

        let eth = g.generate(&GenerationRequest {
            network: reg.lookup("ethereum")?,
            derivation_path: "",
            derivation_password: "",
            reuse_phrase: Some(phrase),
        })?;
        assert!(eth.new_address.starts_with("0x"));
        assert_eq!(eth.new_address.len(), 42);
        Ok(())
    }

    #[test]
    fn debug_does_not_print_the_seed() {
        let g = GeneratedAccount {
            new_address: "5Abc".into(),
            is_bip39: true,
            new_seed: "bottom drive obey".into(),
            requested_with: None,
        };
        assert!(!format!("{g:?}").contains("bottom"));
    }
}
