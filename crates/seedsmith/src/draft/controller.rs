//! New-account workflow: `Empty -> AddressPending -> Ready(Invalid | Valid)`.
//!
//! [`transition`] is pure: it looks at the current snapshot and an event and says what should
//! change. [`AccountDraftController`] applies that change to its [`DraftStore`].

use super::{store::DraftStore, AccountDraft, DraftPatch};
use crate::{
    derivation::parse_derivation_path,
    errors::{EncodeError, LookupError},
    generator::{GeneratedAccount, PathStamp},
    network::{NetworkProtocol, NetworkRegistry, NetworkSpec},
    seed::validate_seed,
    suri::{construct_suri, parse_suri, SuriParts},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Invalid,
    Valid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPhase {
    Empty,
    AddressPending,
    Ready(Readiness),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEvent {
    /// The creation screen was entered.
    Enter,
    SelectNetwork(String),
    AddressGenerated(GeneratedAccount),
    PathEdited(String),
    NameEdited(String),
    Abandon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The event does not apply to the selected network (a path edit on an Ethereum network).
    Ignored,
    /// A generation result computed for a path the draft no longer has.
    Stale,
    /// SURI encoding failed; the previous draft stands.
    EncodeRefused(EncodeError),
}

impl Outcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Ignored => "ignored",
            Self::Stale => "stale",
            Self::EncodeRefused(_) => "encode_refused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Reset,
    Patch(DraftPatch),
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub change: Change,
    pub outcome: Outcome,
}

impl Transition {
    fn applied(change: Change) -> Self {
        Self {
            change,
            outcome: Outcome::Applied,
        }
    }

    const fn unchanged(outcome: Outcome) -> Self {
        Self {
            change: Change::Unchanged,
            outcome,
        }
    }
}

fn selected_protocol(
    draft: &AccountDraft,
    registry: &NetworkRegistry,
) -> Result<Option<NetworkProtocol>, LookupError> {
    if draft.network_key.is_empty() {
        return Ok(None);
    }
    Ok(Some(registry.lookup(&draft.network_key)?.protocol))
}

fn on_select_network(spec: &NetworkSpec) -> Transition {
    let mut patch = DraftPatch {
        network_key: Some(spec.key.clone()),
        ..DraftPatch::cleared_seed()
    };
    if !spec.protocol.embeds_derivation_path() {
        patch.derivation_path = Some(String::new());
        patch.derivation_password = Some(String::new());
        patch.is_derivation_path_valid = Some(true);
    }
    Transition::applied(Change::Patch(patch))
}

fn on_path_edited(raw: &str, protocol: Option<NetworkProtocol>) -> Transition {
    if protocol.is_some_and(|p| !p.embeds_derivation_path()) {
        return Transition::unchanged(Outcome::Ignored);
    }
    let parsed = parse_derivation_path(raw);
    let patch = if parsed.is_valid() {
        DraftPatch {
            derivation_path: Some(parsed.path.junctions_string()),
            derivation_password: Some(parsed.path.password().unwrap_or_default().to_owned()),
            is_derivation_path_valid: Some(true),
            ..DraftPatch::default()
        }
    } else {
        debug!(issues = parsed.issues.len(), "derivation path rejected");
        DraftPatch {
            derivation_path: Some(raw.to_owned()),
            derivation_password: Some(String::new()),
            is_derivation_path_valid: Some(false),
            ..DraftPatch::default()
        }
    };
    Transition::applied(Change::Patch(patch))
}

/// Whether a generation result was computed for the draft's current path.
///
/// The stamp may carry the path as typed (`//p///pw`) or in stored form (junctions plus a
/// separate password); both are compared in stored form.
fn stamp_matches(stamp: &PathStamp, draft: &AccountDraft) -> bool {
    let parsed = parse_derivation_path(&stamp.derivation_path);
    if !parsed.is_valid() {
        return stamp.derivation_path == draft.derivation_path
            && stamp.derivation_password == draft.derivation_password;
    }
    let password = parsed
        .path
        .password()
        .unwrap_or(stamp.derivation_password.as_str());
    parsed.path.junctions_string() == draft.derivation_path
        && password == draft.derivation_password
}

fn on_address_generated(
    draft: &AccountDraft,
    generated: &GeneratedAccount,
    protocol: NetworkProtocol,
) -> Transition {
    if generated.new_address.is_empty() || generated.new_seed.is_empty() {
        return Transition::applied(Change::Patch(DraftPatch::cleared_seed()));
    }
    if let Some(stamp) = &generated.requested_with {
        if !stamp_matches(stamp, draft) {
            debug!("dropping generation result for an outdated derivation path");
            return Transition::unchanged(Outcome::Stale);
        }
    }

    if !protocol.embeds_derivation_path() {
        return Transition::applied(Change::Patch(DraftPatch {
            address: Some(generated.new_address.clone()),
            seed: Some(generated.new_seed.clone()),
            seed_phrase: Some(generated.new_seed.clone()),
            valid_bip39_seed: Some(generated.is_bip39),
            ..DraftPatch::default()
        }));
    }

    // An invalid path is stored as the raw text, which fails to encode the same way it failed
    // to parse, so encoding is never attempted from a malformed path.
    let encoded = construct_suri(&SuriParts {
        phrase: &generated.new_seed,
        derive_path: &draft.derivation_path,
        password: Some(&draft.derivation_password),
    });
    match encoded {
        Ok(suri) => Transition::applied(Change::Patch(DraftPatch {
            address: Some(generated.new_address.clone()),
            seed: Some(suri),
            seed_phrase: Some(generated.new_seed.clone()),
            valid_bip39_seed: Some(generated.is_bip39),
            ..DraftPatch::default()
        })),
        Err(e) => {
            warn!(
                error = %e,
                network = %draft.network_key,
                "SURI encoding failed; keeping previous draft"
            );
            Transition::unchanged(Outcome::EncodeRefused(e))
        }
    }
}

/// Compute the effect of `event` on `draft`.
///
/// Only an unknown network is an error; everything else is expressed as an [`Outcome`].
pub fn transition(
    draft: &AccountDraft,
    event: &DraftEvent,
    registry: &NetworkRegistry,
) -> Result<Transition, LookupError> {
    Ok(match event {
        DraftEvent::Enter | DraftEvent::Abandon => Transition::applied(Change::Reset),
        DraftEvent::SelectNetwork(key) => on_select_network(registry.lookup(key)?),
        DraftEvent::PathEdited(raw) => on_path_edited(raw, selected_protocol(draft, registry)?),
        DraftEvent::NameEdited(name) => Transition::applied(Change::Patch(DraftPatch {
            name: Some(name.clone()),
            ..DraftPatch::default()
        })),
        DraftEvent::AddressGenerated(generated) => {
            let protocol = selected_protocol(draft, registry)?
                .ok_or_else(|| LookupError::UnknownNetwork(String::new()))?;
            on_address_generated(draft, generated, protocol)
        }
    })
}

/// Whether the draft may move on to the backup step.
///
/// The bare phrase is what gets BIP-39 checked. The stored seed must then be exactly what the
/// draft describes: the bare phrase when there is no path, otherwise a SURI that decodes back
/// to that phrase with the draft's current junctions and password.
pub fn can_advance(draft: &AccountDraft) -> bool {
    let phrase = if draft.seed_phrase.is_empty() {
        &draft.seed
    } else {
        &draft.seed_phrase
    };
    if !draft.is_derivation_path_valid || !validate_seed(phrase, draft.valid_bip39_seed).valid {
        return false;
    }
    if draft.seed == *phrase {
        return draft.derivation_path.is_empty() && draft.derivation_password.is_empty();
    }
    parse_suri(&draft.seed).is_ok_and(|s| {
        s.phrase == *phrase
            && s.path.junctions_string() == draft.derivation_path
            && s.password().unwrap_or_default() == draft.derivation_password
    })
}

pub fn phase_of(draft: &AccountDraft) -> DraftPhase {
    if draft.network_key.is_empty() {
        DraftPhase::Empty
    } else if draft.address.is_empty() {
        DraftPhase::AddressPending
    } else if can_advance(draft) {
        DraftPhase::Ready(Readiness::Valid)
    } else {
        DraftPhase::Ready(Readiness::Invalid)
    }
}

/// What the backup step receives.
#[derive(Debug, Clone, Serialize)]
pub struct BackupHandoff {
    pub id: Uuid,
    pub created_at: String,
    pub network_title: String,
    pub draft: AccountDraft,
}

#[derive(Debug, Clone)]
pub enum Advance {
    /// The "next" action is disabled; the draft is untouched.
    Disabled,
    Ready(Box<BackupHandoff>),
}

pub struct AccountDraftController<'r> {
    registry: &'r NetworkRegistry,
    store: DraftStore,
}

impl<'r> AccountDraftController<'r> {
    pub fn new(registry: &'r NetworkRegistry) -> Self {
        Self {
            registry,
            store: DraftStore::new(),
        }
    }

    pub const fn draft(&self) -> &AccountDraft {
        self.store.snapshot()
    }

    pub const fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn phase(&self) -> DraftPhase {
        phase_of(self.store.snapshot())
    }

    pub fn can_advance(&self) -> bool {
        can_advance(self.store.snapshot())
    }

    /// The selected network, if any.
    pub fn network(&self) -> Result<Option<&'r NetworkSpec>, LookupError> {
        let key = &self.store.snapshot().network_key;
        if key.is_empty() {
            return Ok(None);
        }
        self.registry.lookup(key).map(Some)
    }

    pub fn handle(&mut self, event: &DraftEvent) -> Result<Outcome, LookupError> {
        let t = transition(self.store.snapshot(), event, self.registry)?;
        match t.change {
            Change::Reset => self.store.reset(),
            Change::Patch(patch) => self.store.update_new(patch),
            Change::Unchanged => {}
        }
        Ok(t.outcome)
    }

    /// Move to the backup step if the draft allows it. On success the draft is consumed and
    /// the controller is back to `Empty`.
    pub fn advance(&mut self) -> Result<Advance, LookupError> {
        if !self.can_advance() {
            return Ok(Advance::Disabled);
        }
        let network_title = self
            .network()?
            .map(|n| n.title.clone())
            .unwrap_or_default();
        Ok(Advance::Ready(Box::new(BackupHandoff {
            id: Uuid::new_v4(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            network_title,
            draft: self.store.take(),
        })))
    }
}
