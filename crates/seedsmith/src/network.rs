use crate::errors::LookupError;
use serde::{Deserialize, Serialize};

/// Key-derivation family of a network.
///
/// Substrate networks embed the derivation path inside the seed (as a SURI); Ethereum networks
/// store the generated seed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkProtocol {
    Substrate,
    Ethereum,
}

impl NetworkProtocol {
    pub const fn embeds_derivation_path(self) -> bool {
        match self {
            Self::Substrate => true,
            Self::Ethereum => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Genesis hash for Substrate networks, chain id for Ethereum networks.
    pub key: String,
    pub title: String,
    pub protocol: NetworkProtocol,
    /// Short names accepted by `lookup` in addition to `key`.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// SS58 address prefix (Substrate only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<u16>,
    pub decimals: u8,
    pub unit: String,
}

impl NetworkSpec {
    fn matches(&self, needle: &str) -> bool {
        self.key == needle || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(needle))
    }
}

/// A single network definition used by the table-driven [`NetworkRegistry::builtin()`].
struct NetworkDef {
    key: &'static str,
    title: &'static str,
    protocol: NetworkProtocol,
    aliases: &'static [&'static str],
    prefix: Option<u16>,
    decimals: u8,
    unit: &'static str,
}

const BUILTIN_NETWORKS: &[NetworkDef] = &[
    NetworkDef {
        key: "0x91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3",
        title: "Polkadot",
        protocol: NetworkProtocol::Substrate,
        aliases: &["polkadot", "dot"],
        prefix: Some(0),
        decimals: 10,
        unit: "DOT",
    },
    NetworkDef {
        key: "0xb0a8d493285c2df73290dfb7e61f870f17b41801197a149ca93654499ea3dafe",
        title: "Kusama",
        protocol: NetworkProtocol::Substrate,
        aliases: &["kusama", "ksm"],
        prefix: Some(2),
        decimals: 12,
        unit: "KSM",
    },
    NetworkDef {
        key: "0xe143f23803ac50e8f6f8e62695d1ce9e4e1d68aa36c1cd2cfd15340213f3423e",
        title: "Westend",
        protocol: NetworkProtocol::Substrate,
        aliases: &["westend", "wnd"],
        prefix: Some(42),
        decimals: 12,
        unit: "WND",
    },
    NetworkDef {
        key: "1",
        title: "Ethereum",
        protocol: NetworkProtocol::Ethereum,
        aliases: &["ethereum", "eth", "frontier"],
        prefix: None,
        decimals: 18,
        unit: "ETH",
    },
    NetworkDef {
        key: "61",
        title: "Ethereum Classic",
        protocol: NetworkProtocol::Ethereum,
        aliases: &["classic", "etc"],
        prefix: None,
        decimals: 18,
        unit: "ETC",
    },
    NetworkDef {
        key: "3",
        title: "Ropsten Testnet",
        protocol: NetworkProtocol::Ethereum,
        aliases: &["ropsten"],
        prefix: None,
        decimals: 18,
        unit: "ETH",
    },
    NetworkDef {
        key: "5",
        title: "Goerli Testnet",
        protocol: NetworkProtocol::Ethereum,
        aliases: &["goerli"],
        prefix: None,
        decimals: 18,
        unit: "ETH",
    },
    NetworkDef {
        key: "42",
        title: "Kovan Testnet",
        protocol: NetworkProtocol::Ethereum,
        aliases: &["kovan"],
        prefix: None,
        decimals: 18,
        unit: "ETH",
    },
];

impl From<&NetworkDef> for NetworkSpec {
    fn from(def: &NetworkDef) -> Self {
        Self {
            key: def.key.into(),
            title: def.title.into(),
            protocol: def.protocol,
            aliases: def.aliases.iter().map(|&a| a.into()).collect(),
            prefix: def.prefix,
            decimals: def.decimals,
            unit: def.unit.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: Vec<NetworkSpec>,
}

impl NetworkRegistry {
    pub fn builtin() -> Self {
        Self {
            networks: BUILTIN_NETWORKS.iter().map(NetworkSpec::from).collect(),
        }
    }

    /// Built-in networks plus user-defined ones. A custom entry replaces a built-in entry with
    /// the same key.
    pub fn with_custom(custom: &[NetworkSpec]) -> Self {
        let mut reg = Self::builtin();
        for spec in custom {
            match reg.networks.iter_mut().find(|n| n.key == spec.key) {
                Some(existing) => *existing = spec.clone(),
                None => reg.networks.push(spec.clone()),
            }
        }
        reg
    }

    pub fn list(&self) -> &[NetworkSpec] {
        &self.networks
    }

    /// Resolve a network by key or alias.
    pub fn lookup(&self, key: &str) -> Result<&NetworkSpec, LookupError> {
        let needle = key.trim();
        self.networks
            .iter()
            .find(|n| n.matches(needle))
            .ok_or_else(|| LookupError::UnknownNetwork(needle.to_owned()))
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
