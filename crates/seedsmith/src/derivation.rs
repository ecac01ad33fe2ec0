//! Derivation path grammar: `/soft`, `//hard` and a terminal `///password`.
//!
//! Separators are read as maximal runs of `/`. A run of one introduces a soft junction, a run of
//! two a hard junction, and a run of three the password, which then extends to the end of the
//! input. Longer runs cannot introduce anything unambiguously and are reported as an empty
//! junction.

use crate::errors::PathError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const PASSWORD_SEPARATOR: &str = "///";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JunctionKind {
    Soft,
    Hard,
}

impl JunctionKind {
    pub const fn separator(self) -> &'static str {
        match self {
            Self::Soft => "/",
            Self::Hard => "//",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationJunction {
    pub value: String,
    pub kind: JunctionKind,
}

impl DerivationJunction {
    pub fn soft(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: JunctionKind::Soft,
        }
    }

    pub fn hard(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: JunctionKind::Hard,
        }
    }

    pub const fn is_hard(&self) -> bool {
        matches!(self.kind, JunctionKind::Hard)
    }
}

impl fmt::Display for DerivationJunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.separator(), self.value)
    }
}

/// Ordered junctions plus at most one password.
///
/// An empty password is normalised to `None` so that `///` with nothing after it means "no
/// password" everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuriPath {
    pub junctions: Vec<DerivationJunction>,
    pub password: Option<String>,
}

impl SuriPath {
    pub fn new(junctions: Vec<DerivationJunction>, password: Option<String>) -> Self {
        Self {
            junctions,
            password: password.filter(|p| !p.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty() && self.password.is_none()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The junctions alone, without the password segment.
    pub fn junctions_string(&self) -> String {
        self.junctions.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for SuriPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for j in &self.junctions {
            write!(f, "{j}")?;
        }
        if let Some(pw) = &self.password {
            write!(f, "{PASSWORD_SEPARATOR}{pw}")?;
        }
        Ok(())
    }
}

impl FromStr for SuriPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_derivation_path(s).into_result()
    }
}

/// Result of a lenient parse: whatever could be read, plus every grammar violation found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPath {
    pub path: SuriPath,
    pub issues: Vec<PathError>,
}

impl ParsedPath {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_result(self) -> Result<SuriPath, PathError> {
        match self.issues.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(self.path),
        }
    }
}

/// Parse a user-typed derivation path.
///
/// Never fails outright: on a grammar violation the returned [`ParsedPath`] carries the issues
/// together with the junctions that could still be read, so a UI can keep showing the draft.
pub fn parse_derivation_path(raw: &str) -> ParsedPath {
    let mut junctions = Vec::new();
    let mut password = None;
    let mut issues = Vec::new();

    let mut rest = raw;
    let mut offset = 0_usize;
    while !rest.is_empty() {
        let after = rest.trim_start_matches('/');
        let slashes = rest.len().saturating_sub(after.len());
        let (token, tail) = after.split_at(after.find('/').unwrap_or(after.len()));

        match slashes {
            0 => issues.push(PathError::MissingSeparator { offset }),
            1 | 2 => {
                if token.is_empty() {
                    issues.push(PathError::UnterminatedSeparator);
                } else {
                    let kind = if slashes == 1 {
                        JunctionKind::Soft
                    } else {
                        JunctionKind::Hard
                    };
                    junctions.push(DerivationJunction {
                        value: token.to_owned(),
                        kind,
                    });
                }
            }
            3 => {
                let pw = match after.split_once(PASSWORD_SEPARATOR) {
                    Some((first, _)) => {
                        issues.push(PathError::DuplicatePassword);
                        first
                    }
                    None => after,
                };
                password = Some(pw.to_owned());
                break;
            }
            _ => {
                issues.push(PathError::EmptyJunction { offset });
                if !token.is_empty() {
                    junctions.push(DerivationJunction::hard(token));
                }
            }
        }

        offset = offset.saturating_add(slashes).saturating_add(token.len());
        rest = tail;
    }

    ParsedPath {
        path: SuriPath::new(junctions, password),
        issues,
    }
}
