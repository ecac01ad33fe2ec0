//! Line-delimited JSON event loop for `seedsmith new`.
//!
//! Each input line is one user action (`{"event":"path","value":"//polkadot"}`); each output
//! line is the resulting draft snapshot. The loop ends on `next` (when allowed), `abandon`, or
//! end of input.

use crate::{
    draft::{
        controller::{
            AccountDraftController, Advance, BackupHandoff, DraftEvent, DraftPhase, Outcome,
        },
        AccountDraft,
    },
    errors::{CliError, LookupError},
    generator::{AddressGenerator, GeneratedAccount, GenerationRequest},
    network::NetworkRegistry,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncReadExt as _, AsyncWrite};
use tracing::{info, warn};
use zeroize::{Zeroize as _, Zeroizing};

/// Longest accepted event line, terminator included. Longer lines are skipped unread.
pub const MAX_EVENT_LINE_BYTES: u64 = 64 * 1024;

enum InputLine {
    Text(Zeroizing<String>),
    TooLong,
    NotUtf8,
}

/// Discard input up to and including the next newline without buffering it.
async fn skip_rest_of_line<R>(input: &mut R) -> eyre::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let chunk = input.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(());
        }
        match chunk.iter().position(|b| *b == b'\n') {
            Some(i) => {
                input.consume(i.saturating_add(1));
                return Ok(());
            }
            None => {
                let len = chunk.len();
                input.consume(len);
            }
        }
    }
}

/// Read one line, never holding more than [`MAX_EVENT_LINE_BYTES`] of it in memory.
async fn read_event_line<R>(input: &mut R) -> eyre::Result<Option<InputLine>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Zeroizing::new(Vec::new());
    let n = (&mut *input)
        .take(MAX_EVENT_LINE_BYTES)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if buf.last() != Some(&b'\n') && u64::try_from(n).is_ok_and(|n| n >= MAX_EVENT_LINE_BYTES) {
        skip_rest_of_line(input).await?;
        return Ok(Some(InputLine::TooLong));
    }
    while buf.last().is_some_and(|b| *b == b'\n' || *b == b'\r') {
        buf.pop();
    }
    Ok(Some(match String::from_utf8(std::mem::take(&mut *buf)) {
        Ok(s) => InputLine::Text(Zeroizing::new(s)),
        Err(e) => {
            e.into_bytes().zeroize();
            InputLine::NotUtf8
        }
    }))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum SessionEvent {
    Network { value: String },
    Path { value: String },
    Name { value: String },
    /// Ask the address generator for a fresh candidate.
    Generate,
    /// A result produced by an external generator.
    Generated(GeneratedAccount),
    /// The user cleared the address field.
    Clear,
    Next,
    Abandon,
}

impl SessionEvent {
    const fn name(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Path { .. } => "path",
            Self::Name { .. } => "name",
            Self::Generate => "generate",
            Self::Generated(_) => "generated",
            Self::Clear => "clear",
            Self::Next => "next",
            Self::Abandon => "abandon",
        }
    }
}

#[derive(Debug, Serialize)]
struct DraftFrame<'a> {
    event: &'static str,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    phase: DraftPhase,
    can_advance: bool,
    revision: u64,
    draft: &'a AccountDraft,
}

#[derive(Debug, Serialize)]
struct HandoffFrame<'a> {
    event: &'static str,
    outcome: &'static str,
    handoff: &'a BackupHandoff,
}

pub async fn write_frame<W, T>(out: &mut W, v: &T) -> eyre::Result<()>
where
    W: AsyncWrite + Unpin + Send,
    T: Serialize,
{
    use tokio::io::AsyncWriteExt as _;

    let line = Zeroizing::new(format!("{}\n", serde_json::to_string(v)?));
    out.write_all(line.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

pub struct Session<'r, G> {
    controller: AccountDraftController<'r>,
    generator: G,
}

impl<'r, G: AddressGenerator> Session<'r, G> {
    /// Enter the creation flow with `network` preselected.
    pub fn start(
        registry: &'r NetworkRegistry,
        network: &str,
        generator: G,
    ) -> Result<Self, LookupError> {
        let mut controller = AccountDraftController::new(registry);
        controller.handle(&DraftEvent::Enter)?;
        controller.handle(&DraftEvent::SelectNetwork(network.to_owned()))?;
        Ok(Self {
            controller,
            generator,
        })
    }

    pub const fn controller(&self) -> &AccountDraftController<'r> {
        &self.controller
    }

    /// Run the generator against the current path and feed its result back as an event.
    ///
    /// With `reuse_phrase`, the current phrase is re-derived rather than replaced.
    fn generate(&mut self, reuse_phrase: bool) -> eyre::Result<Outcome> {
        let Some(network) = self.controller.network()? else {
            eyre::bail!("no network selected");
        };
        let draft = self.controller.draft();
        let req = GenerationRequest {
            network,
            derivation_path: &draft.derivation_path,
            derivation_password: &draft.derivation_password,
            reuse_phrase: (reuse_phrase && !draft.seed_phrase.is_empty())
                .then_some(draft.seed_phrase.as_str()),
        };
        let generated = self.generator.generate(&req)?;
        Ok(self
            .controller
            .handle(&DraftEvent::AddressGenerated(generated))?)
    }

    async fn write_draft<W>(
        &self,
        out: &mut W,
        event: &'static str,
        outcome: &'static str,
        message: Option<String>,
    ) -> eyre::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let draft = self.controller.draft();
        let frame = DraftFrame {
            event,
            outcome,
            message,
            phase: self.controller.phase(),
            can_advance: self.controller.can_advance(),
            revision: self.controller.revision(),
            draft,
        };
        write_frame(out, &frame).await
    }

    fn dispatch(&mut self, event: SessionEvent) -> eyre::Result<Outcome> {
        let outcome = match event {
            SessionEvent::Network { value } => {
                self.controller.handle(&DraftEvent::SelectNetwork(value))?
            }
            SessionEvent::Path { value } => {
                let outcome = self.controller.handle(&DraftEvent::PathEdited(value))?;
                let draft = self.controller.draft();
                // The chosen address must follow the path, as the icon chooser would redraw.
                if outcome == Outcome::Applied
                    && draft.is_derivation_path_valid
                    && !draft.seed_phrase.is_empty()
                {
                    let refreshed = self.generate(true)?;
                    if refreshed != Outcome::Applied {
                        warn!(outcome = refreshed.label(), "address refresh after path edit");
                    }
                }
                outcome
            }
            SessionEvent::Name { value } => self.controller.handle(&DraftEvent::NameEdited(value))?,
            SessionEvent::Generate => self.generate(false)?,
            SessionEvent::Generated(generated) => self
                .controller
                .handle(&DraftEvent::AddressGenerated(generated))?,
            SessionEvent::Clear => self
                .controller
                .handle(&DraftEvent::AddressGenerated(GeneratedAccount::cleared()))?,
            SessionEvent::Abandon => self.controller.handle(&DraftEvent::Abandon)?,
            // Handled by the loop.
            SessionEvent::Next => Outcome::Ignored,
        };
        Ok(outcome)
    }

    /// Drive the session until it finishes. Returns the handoff when the user advanced.
    pub async fn run<R, W>(
        &mut self,
        mut input: R,
        out: &mut W,
    ) -> eyre::Result<Option<BackupHandoff>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send,
    {
        self.write_draft(out, "start", Outcome::Applied.label(), None)
            .await?;

        while let Some(read) = read_event_line(&mut input).await? {
            let line = match read {
                InputLine::Text(line) => line,
                InputLine::TooLong => {
                    warn!(limit = MAX_EVENT_LINE_BYTES, "session event line too long");
                    write_frame(out, &CliError::new("invalid_event", "event line too long"))
                        .await?;
                    continue;
                }
                InputLine::NotUtf8 => {
                    write_frame(out, &CliError::new("invalid_event", "event is not UTF-8"))
                        .await?;
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let event: SessionEvent = match serde_json::from_str(&line) {
                Ok(ev) => ev,
                Err(e) => {
                    warn!(error = %e, "invalid session event");
                    write_frame(out, &CliError::new("invalid_event", e.to_string())).await?;
                    continue;
                }
            };
            let name = event.name();

            match event {
                SessionEvent::Next => match self.controller.advance()? {
                    Advance::Disabled => {
                        self.write_draft(out, name, "advance_disabled", None).await?;
                    }
                    Advance::Ready(handoff) => {
                        info!(
                            id = %handoff.id,
                            network = %handoff.network_title,
                            "draft handed to backup"
                        );
                        let frame = HandoffFrame {
                            event: name,
                            outcome: "advanced",
                            handoff: &handoff,
                        };
                        write_frame(out, &frame).await?;
                        return Ok(Some(*handoff));
                    }
                },
                SessionEvent::Abandon => {
                    self.dispatch(event)?;
                    self.write_draft(out, name, "abandoned", None).await?;
                    return Ok(None);
                }
                SessionEvent::Generate => match self.dispatch(event) {
                    Ok(outcome) => self.write_outcome(out, name, &outcome).await?,
                    Err(e) if e.downcast_ref::<LookupError>().is_some() => return Err(e),
                    Err(e) => {
                        warn!(error = %e, "address generation failed");
                        write_frame(out, &CliError::new("generation_failed", e.to_string()))
                            .await?;
                    }
                },
                other => {
                    let outcome = self.dispatch(other)?;
                    self.write_outcome(out, name, &outcome).await?;
                }
            }
        }

        // End of input without advancing: the draft is abandoned.
        self.controller.handle(&DraftEvent::Abandon)?;
        Ok(None)
    }

    async fn write_outcome<W>(
        &self,
        out: &mut W,
        event: &'static str,
        outcome: &Outcome,
    ) -> eyre::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let message = match outcome {
            Outcome::EncodeRefused(e) => Some(e.to_string()),
            Outcome::Applied | Outcome::Ignored | Outcome::Stale => None,
        };
        self.write_draft(out, event, outcome.label(), message).await
    }
}
