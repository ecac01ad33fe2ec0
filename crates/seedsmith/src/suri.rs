//! SURI ("seed URI") codec: `<phrase>[/soft|//hard]*[///password]`.

use crate::{
    derivation::{SuriPath, PASSWORD_SEPARATOR},
    errors::{DecodeError, EncodeError},
    seed::SeedCandidate,
};
use std::{fmt, str::FromStr};

/// Inputs to [`construct_suri`].
///
/// The password may arrive either inside `derive_path` (as a `///` segment) or separately in
/// `password`; it is always emitted once, at the end.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuriParts<'a> {
    pub phrase: &'a str,
    pub derive_path: &'a str,
    pub password: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suri {
    pub phrase: String,
    pub path: SuriPath,
}

impl Suri {
    pub fn password(&self) -> Option<&str> {
        self.path.password()
    }

    pub fn candidate(&self) -> SeedCandidate {
        SeedCandidate::classify(&self.phrase)
    }
}

impl fmt::Display for Suri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.phrase, self.path)
    }
}

impl FromStr for Suri {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_suri(s)
    }
}

/// Words separated by single spaces, no `/` anywhere.
fn is_well_formed_phrase(phrase: &str) -> bool {
    !phrase.contains('/')
        && phrase
            .split(' ')
            .all(|w| !w.is_empty() && !w.chars().any(char::is_whitespace))
}

fn is_well_formed_password(password: &str) -> bool {
    !password.starts_with('/') && !password.contains(PASSWORD_SEPARATOR)
}

pub fn construct_suri(parts: &SuriParts<'_>) -> Result<String, EncodeError> {
    if parts.phrase.is_empty() {
        return Err(EncodeError::EmptyPhrase);
    }
    if !is_well_formed_phrase(parts.phrase) {
        return Err(EncodeError::MalformedPhrase);
    }

    let mut path: SuriPath = parts.derive_path.parse()?;
    match (path.password(), parts.password.filter(|p| !p.is_empty())) {
        (Some(in_path), Some(separate)) if in_path != separate => {
            return Err(EncodeError::ConflictingPassword);
        }
        (None, Some(separate)) => {
            if !is_well_formed_password(separate) {
                return Err(EncodeError::MalformedPassword);
            }
            path.password = Some(separate.to_owned());
        }
        _ => {}
    }

    Ok(format!("{}{path}", parts.phrase))
}

pub fn parse_suri(suri: &str) -> Result<Suri, DecodeError> {
    let (phrase, derive_path) = suri.split_at(suri.find('/').unwrap_or(suri.len()));
    if phrase.trim().is_empty() {
        return Err(DecodeError::MissingPhrase);
    }
    if !is_well_formed_phrase(phrase) {
        return Err(DecodeError::MalformedPhrase);
    }
    let path = derive_path.parse::<SuriPath>()?;
    Ok(Suri {
        phrase: phrase.to_owned(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{derivation::DerivationJunction, errors::PathError};

    const DEV_PHRASE: &str =
        "bottom drive obey lake curtain smoke basket hold race lonely fit walk";

    #[test]
    fn encodes_hard_path_with_password() -> eyre::Result<()> {
        let suri = construct_suri(&SuriParts {
            phrase: DEV_PHRASE,
            derive_path: "//polkadot///mypassword",
            password: None,
        })?;
        assert_eq!(
            suri,
            "bottom drive obey lake curtain smoke basket hold race lonely fit walk//polkadot///mypassword"
        );
        Ok(())
    }

    #[test]
    fn separate_password_is_appended_once_at_the_end() -> eyre::Result<()> {
        let split = construct_suri(&SuriParts {
            phrase: DEV_PHRASE,
            derive_path: "//polkadot",
            password: Some("mypassword"),
        })?;
        let inline = construct_suri(&SuriParts {
            phrase: DEV_PHRASE,
            derive_path: "//polkadot///mypassword",
            password: Some("mypassword"),
        })?;
        assert_eq!(split, inline);
        assert_eq!(split.matches(PASSWORD_SEPARATOR).count(), 1);
        Ok(())
    }

    #[test]
    fn empty_phrase_and_bad_paths_fail_to_encode() {
        let empty = construct_suri(&SuriParts::default());
        assert_eq!(empty, Err(EncodeError::EmptyPhrase));

        let bad_path = construct_suri(&SuriParts {
            phrase: DEV_PHRASE,
            derive_path: "//a///pw1///pw2",
            password: None,
        });
        assert_eq!(
            bad_path,
            Err(EncodeError::InvalidPath(PathError::DuplicatePassword))
        );

        let conflict = construct_suri(&SuriParts {
            phrase: DEV_PHRASE,
            derive_path: "//a///one",
            password: Some("two"),
        });
        assert_eq!(conflict, Err(EncodeError::ConflictingPassword));

        let slashy = construct_suri(&SuriParts {
            phrase: DEV_PHRASE,
            derive_path: "//a",
            password: Some("/leading"),
        });
        assert_eq!(slashy, Err(EncodeError::MalformedPassword));

        let phrase_with_path = construct_suri(&SuriParts {
            phrase: "word//hidden",
            derive_path: "",
            password: None,
        });
        assert_eq!(phrase_with_path, Err(EncodeError::MalformedPhrase));
    }

    #[test]
    fn decode_recovers_structure() -> eyre::Result<()> {
        let suri: Suri = "0xabc123/soft//hard///pw/with/slashes".parse()?;
        assert_eq!(suri.phrase, "0xabc123");
        assert_eq!(
            suri.path.junctions,
            vec![
                DerivationJunction::soft("soft"),
                DerivationJunction::hard("hard")
            ]
        );
        assert_eq!(suri.password(), Some("pw/with/slashes"));
        assert!(matches!(suri.candidate(), SeedCandidate::RawHex(_)));
        Ok(())
    }

    #[test]
    fn decode_rejects_missing_phrase_and_bad_grammar() {
        assert_eq!(parse_suri(""), Err(DecodeError::MissingPhrase));
        assert_eq!(parse_suri("//polkadot"), Err(DecodeError::MissingPhrase));
        assert_eq!(parse_suri("   //a"), Err(DecodeError::MissingPhrase));
        assert_eq!(
            parse_suri("one  two//a"),
            Err(DecodeError::MalformedPhrase)
        );
        assert_eq!(
            parse_suri("phrase//a/"),
            Err(DecodeError::InvalidPath(PathError::UnterminatedSeparator))
        );
        assert_eq!(
            parse_suri("phrase//a///x///y"),
            Err(DecodeError::InvalidPath(PathError::DuplicatePassword))
        );
    }

    #[test]
    fn encode_then_decode_is_lossless() -> eyre::Result<()> {
        let cases: &[(&str, &str, Option<&str>)] = &[
            (DEV_PHRASE, "", None),
            (DEV_PHRASE, "//polkadot", None),
            (DEV_PHRASE, "//polkadot", Some("mypassword")),
            (DEV_PHRASE, "//polkadot///mypassword", None),
            ("0xabc123", "/0/1//2//2", Some("p/w")),
            ("0xabc123", "//Alice", None),
            ("single", "//a/b//c", Some("")),
        ];
        for &(phrase, derive_path, password) in cases {
            let encoded = construct_suri(&SuriParts {
                phrase,
                derive_path,
                password,
            })?;
            let decoded = parse_suri(&encoded)?;

            let mut expected: SuriPath = derive_path.parse()?;
            if expected.password.is_none() {
                expected.password = password.filter(|p| !p.is_empty()).map(str::to_owned);
            }
            assert_eq!(decoded.phrase, phrase, "phrase for {encoded:?}");
            assert_eq!(decoded.path, expected, "path for {encoded:?}");
            assert_eq!(decoded.to_string(), encoded);
        }
        Ok(())
    }
}
