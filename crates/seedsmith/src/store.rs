use crate::{config::SeedsmithConfig, paths::SeedsmithPaths};
use eyre::Context as _;
use std::{fs, path::PathBuf};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

/// Apply environment variable overrides. Overrides are session-only and never persisted.
fn apply_env_overrides(cfg: &mut SeedsmithConfig) {
    fn env_trimmed(var: &str) -> Option<String> {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    if let Some(v) = env_trimmed("SEEDSMITH_DEFAULT_NETWORK") {
        cfg.default_network = v;
    }
    if let Some(n) = env_trimmed("SEEDSMITH_MNEMONIC_WORDS").and_then(|v| v.parse().ok()) {
        cfg.mnemonic_words = n;
    }
}

impl ConfigStore {
    pub fn new(paths: &SeedsmithPaths) -> Self {
        Self {
            path: paths.config_file(),
        }
    }

    pub fn load_or_init_default(&self) -> eyre::Result<SeedsmithConfig> {
        let mut cfg = if self.path.exists() {
            let s = fs::read_to_string(&self.path).context("read config.toml")?;
            toml::from_str(&s).context("parse config.toml")?
        } else {
            let cfg = SeedsmithConfig::default();
            self.save(&cfg)?;
            cfg
        };
        apply_env_overrides(&mut cfg);
        cfg.validate().context("invalid config.toml")?;
        Ok(cfg)
    }

    pub fn save(&self, cfg: &SeedsmithConfig) -> eyre::Result<()> {
        let s = toml::to_string_pretty(cfg).context("serialize config.toml")?;
        crate::fsutil::write_private_atomic(&self.path, &s).context("write config.toml")
    }
}
