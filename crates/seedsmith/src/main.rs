use clap::{Parser, Subcommand};
use eyre::Context as _;
use serde_json::json;
use tokio::io::AsyncReadExt as _;
use tracing::info;
use tracing_subscriber::prelude::*;
use zeroize::Zeroizing;

mod cli_output;
mod config;
mod derivation;
mod draft;
mod errors;
mod fsutil;
mod generator;
mod network;
mod paths;
mod seed;
mod session;
mod store;
mod suri;

use errors::{CliError, SeedsmithError};

#[derive(Parser, Debug)]
#[command(name = "seedsmith", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

/// Secrets (phrases, SURIs, passwords) are read from stdin, never from argv.
#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a seed read from stdin and print the verdict as JSON.
    ValidateSeed {
        /// Treat the seed as a BIP-39 mnemonic (word count and checksum are enforced).
        #[arg(long, default_value_t = false)]
        bip39: bool,
    },

    /// Parse a derivation path such as `//polkadot/0///password`.
    ///
    /// Reads the path from stdin when PATH is omitted.
    ParsePath { path: Option<String> },

    /// Build a SURI from the phrase on the first stdin line.
    ///
    /// An optional second stdin line is used as the password.
    Encode {
        /// Derivation path appended to the phrase. May carry its own `///password`.
        #[arg(long, default_value = "")]
        path: String,
    },

    /// Split the SURI read from stdin into phrase, junctions and password.
    Decode {
        /// Include the phrase and password in the output.
        #[arg(long, default_value_t = false)]
        reveal: bool,
    },

    /// List the networks an account can be created for.
    Networks,

    /// Start a new-account session driven by JSON events on stdin.
    New {
        /// Network key or alias (defaults to `default_network` from config.toml).
        #[arg(long)]
        network: Option<String>,
    },

    /// Print the config and data locations.
    Paths,
}

fn init_logging(paths: &paths::SeedsmithPaths) -> tracing_appender::non_blocking::WorkerGuard {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let file_name = paths
        .log_file
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("seedsmith.log.jsonl");
    let file_appender = tracing_appender::rolling::never(&paths.data_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_filter(env_filter.clone());
    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

async fn read_stdin() -> eyre::Result<Zeroizing<String>> {
    let mut buf = Zeroizing::new(String::new());
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("read stdin")?;
    Ok(buf)
}

/// First line of `input` without its line terminator.
fn first_line(input: &str) -> &str {
    input.lines().next().unwrap_or_default()
}

/// Report `e` as JSON on stdout and fail the command with it.
fn fail(e: SeedsmithError) -> eyre::Result<()> {
    cli_output::print_json(&CliError::from(e.clone()))?;
    Err(e.into())
}

fn validate_seed_cmd(input: &str, bip39: bool) -> eyre::Result<()> {
    let verdict = seed::validate_seed(first_line(input), bip39);
    cli_output::print_json(&verdict)?;
    if !verdict.valid {
        eyre::bail!(
            "seed rejected: {}",
            verdict.reason.as_deref().unwrap_or("invalid")
        );
    }
    Ok(())
}

fn parse_path_cmd(raw: &str) -> eyre::Result<()> {
    let parsed = derivation::parse_derivation_path(raw);
    cli_output::print_json(&json!({
        "valid": parsed.is_valid(),
        "empty": parsed.path.is_empty(),
        "path": parsed.path.junctions_string(),
        "junctions": parsed.path.junctions,
        "has_password": parsed.path.password().is_some(),
        "issues": parsed.issues,
    }))?;
    match parsed.into_result() {
        Ok(_) => Ok(()),
        Err(e) => Err(SeedsmithError::Path(e).into()),
    }
}

fn encode_cmd(input: &str, path: &str) -> eyre::Result<()> {
    let mut lines = input.lines();
    let phrase = lines.next().unwrap_or_default();
    let password = lines.next().filter(|p| !p.is_empty());
    match suri::construct_suri(&suri::SuriParts {
        phrase,
        derive_path: path,
        password,
    }) {
        Ok(s) => {
            let s = Zeroizing::new(s);
            cli_output::print_json(&json!({ "suri": s.as_str() }))
        }
        Err(e) => fail(e.into()),
    }
}

fn decode_cmd(input: &str, reveal: bool) -> eyre::Result<()> {
    let decoded = match suri::parse_suri(first_line(input)) {
        Ok(s) => s,
        Err(e) => return fail(e.into()),
    };
    let phrase_kind = match decoded.candidate() {
        seed::SeedCandidate::RawHex(_) => "raw_hex",
        seed::SeedCandidate::Mnemonic(_) | seed::SeedCandidate::Empty => "words",
    };
    let mut out = json!({
        "phrase_kind": phrase_kind,
        "phrase_words": decoded.phrase.split(' ').count(),
        "path": decoded.path.junctions_string(),
        "hard_junctions": decoded.path.junctions.iter().filter(|j| j.is_hard()).count(),
        "junctions": decoded.path.junctions,
        "has_password": decoded.password().is_some(),
    });
    if reveal {
        if let Some(obj) = out.as_object_mut() {
            obj.insert("phrase".into(), json!(decoded.phrase));
            obj.insert("password".into(), json!(decoded.password()));
        }
    }
    cli_output::print_json(&out)
}

async fn new_cmd(cfg: &config::SeedsmithConfig, network: Option<&str>) -> eyre::Result<()> {
    let registry = cfg.registry();
    let wanted = network.unwrap_or(&cfg.default_network);
    let spec = match registry.lookup(wanted) {
        Ok(spec) => spec,
        Err(e) => return fail(e.into()),
    };
    let protocol = match spec.protocol {
        network::NetworkProtocol::Substrate => "substrate",
        network::NetworkProtocol::Ethereum => "ethereum",
    };
    cli_output::print_session_banner(env!("CARGO_PKG_VERSION"), &spec.title, protocol);

    let generator = generator::PreviewGenerator::new(cfg.mnemonic_words);
    let mut session = session::Session::start(&registry, &spec.key, generator)?;
    info!(network = %spec.key, "new-account session started");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    match session.run(stdin, &mut stdout).await? {
        Some(handoff) => info!(id = %handoff.id, "new-account session completed"),
        None => {
            info!(revision = session.controller().revision(), "new-account session abandoned");
            cli_output::print_draft_abandoned();
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let paths = paths::SeedsmithPaths::discover()?;
    paths.ensure_private_dirs().context("create seedsmith dirs")?;
    let _log_guard = init_logging(&paths);

    match cli.cmd {
        Command::ValidateSeed { bip39 } => validate_seed_cmd(&read_stdin().await?, bip39),
        Command::ParsePath { path } => match path {
            Some(p) => parse_path_cmd(&p),
            None => parse_path_cmd(first_line(&read_stdin().await?)),
        },
        Command::Encode { path } => encode_cmd(&read_stdin().await?, &path),
        Command::Decode { reveal } => decode_cmd(&read_stdin().await?, reveal),
        Command::Networks => {
            let cfg = store::ConfigStore::new(&paths).load_or_init_default()?;
            cli_output::print_json(&cfg.registry().list())
        }
        Command::New { network } => {
            let cfg = store::ConfigStore::new(&paths).load_or_init_default()?;
            new_cmd(&cfg, network.as_deref()).await
        }
        Command::Paths => cli_output::print_json(&json!({
            "config_dir": paths.config_dir,
            "config_file": paths.config_file(),
            "data_dir": paths.data_dir,
            "log_file": paths.log_file,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_strips_terminators() {
        assert_eq!(first_line("abc\r\n"), "abc");
        assert_eq!(first_line("abc\ndef"), "abc");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory as _;
        Cli::command().debug_assert();
    }
}
