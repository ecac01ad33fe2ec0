use crate::{network::NetworkRegistry, network::NetworkSpec, seed::ACCEPTED_WORD_COUNTS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NETWORK: &str = "polkadot";
pub const DEFAULT_MNEMONIC_WORDS: usize = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedsmithConfig {
    /// Network preselected by `seedsmith new` when `--network` is omitted (key or alias).
    pub default_network: String,

    /// Word count of mnemonics produced by the preview address generator.
    pub mnemonic_words: usize,

    /// Additional networks. An entry whose `key` matches a built-in network replaces it.
    pub networks: Vec<NetworkSpec>,
}

impl Default for SeedsmithConfig {
    fn default() -> Self {
        Self {
            default_network: DEFAULT_NETWORK.into(),
            mnemonic_words: DEFAULT_MNEMONIC_WORDS,
            networks: Vec::new(),
        }
    }
}

impl SeedsmithConfig {
    pub fn registry(&self) -> NetworkRegistry {
        NetworkRegistry::with_custom(&self.networks)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if !ACCEPTED_WORD_COUNTS.contains(&self.mnemonic_words) {
            eyre::bail!(
                "mnemonic_words must be one of 12, 15, 18, 21, 24 (got {})",
                self.mnemonic_words
            );
        }
        self.registry()
            .lookup(&self.default_network)
            .map_err(|e| eyre::eyre!("default_network: {e}"))?;
        Ok(())
    }
}
