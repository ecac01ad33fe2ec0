//! Seed classification and BIP-39 validation.
//!
//! Nothing here caches validity: every call re-derives the verdict from the raw string.

use bip39::{Language, Mnemonic};
use serde::{Deserialize, Serialize};

/// Word counts accepted by BIP-39 (128..=256 bits of entropy in 32-bit steps).
pub const ACCEPTED_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedCandidate {
    Empty,
    /// `0x`-prefixed raw seed bytes.
    RawHex(Vec<u8>),
    Mnemonic(Vec<String>),
}

impl SeedCandidate {
    pub fn classify(seed: &str) -> Self {
        let trimmed = seed.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if let Some(digits) = trimmed.strip_prefix("0x") {
            if let Ok(bytes) = hex::decode(digits) {
                if !bytes.is_empty() {
                    return Self::RawHex(bytes);
                }
            }
        }
        Self::Mnemonic(trimmed.split_whitespace().map(str::to_owned).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedKind {
    Empty,
    Unknown,
    Bip39,
    Dev,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedValidation {
    #[serde(rename = "type")]
    pub kind: SeedKind,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SeedValidation {
    const fn ok(kind: SeedKind) -> Self {
        Self {
            kind,
            valid: true,
            reason: None,
        }
    }

    fn rejected(kind: SeedKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Validate `seed`.
///
/// `is_bip39_checked` is the caller's claim that the seed came out of a BIP-39 generation path.
/// Checked seeds must pass word-count and checksum verification; unchecked seeds are developer
/// seeds (raw hex, `//Alice`-style phrases) and only need to be non-empty.
pub fn validate_seed(seed: &str, is_bip39_checked: bool) -> SeedValidation {
    let candidate = SeedCandidate::classify(seed);
    if candidate == SeedCandidate::Empty {
        return SeedValidation::rejected(SeedKind::Empty, "a seed phrase is required");
    }
    if !is_bip39_checked {
        return SeedValidation::ok(SeedKind::Dev);
    }

    match candidate {
        SeedCandidate::Mnemonic(words) => validate_mnemonic(seed.trim(), &words),
        SeedCandidate::RawHex(_) | SeedCandidate::Empty => {
            SeedValidation::rejected(SeedKind::Unknown, "raw hex seed is not a BIP-39 mnemonic")
        }
    }
}

fn validate_mnemonic(phrase: &str, words: &[String]) -> SeedValidation {
    if phrase != words.join(" ") {
        return SeedValidation::rejected(SeedKind::Unknown, "extra whitespace found");
    }
    if !ACCEPTED_WORD_COUNTS.contains(&words.len()) {
        return SeedValidation::rejected(
            SeedKind::Unknown,
            format!(
                "expected 12, 15, 18, 21 or 24 words, found {}",
                words.len()
            ),
        );
    }

    match Mnemonic::parse_in_normalized(Language::English, phrase) {
        Ok(_) => SeedValidation::ok(SeedKind::Bip39),
        Err(bip39::Error::UnknownWord(idx)) => SeedValidation::rejected(
            SeedKind::Unknown,
            format!("unknown word at position {}", idx.saturating_add(1)),
        ),
        Err(bip39::Error::InvalidChecksum) => {
            SeedValidation::rejected(SeedKind::Unknown, "invalid mnemonic checksum")
        }
        Err(e) => SeedValidation::rejected(SeedKind::Unknown, e.to_string()),
    }
}

/// Generate a fresh English mnemonic with `word_count` words.
pub fn generate_mnemonic(word_count: usize) -> eyre::Result<String> {
    use eyre::Context as _;

    if !ACCEPTED_WORD_COUNTS.contains(&word_count) {
        eyre::bail!("unsupported mnemonic length: {word_count}");
    }
    let mnemonic =
        Mnemonic::generate_in(Language::English, word_count).context("generate mnemonic")?;
    Ok(mnemonic.to_string())
}
