use assert_cmd::Command;
use eyre::Context as _;
use predicates::prelude::*;
use serde_json::Value;

const DEV_PHRASE: &str = "bottom drive obey lake curtain smoke basket hold race lonely fit walk";

struct Env {
    cfg_dir: tempfile::TempDir,
    data_dir: tempfile::TempDir,
}

impl Env {
    fn new() -> eyre::Result<Self> {
        Ok(Self {
            cfg_dir: tempfile::tempdir()?,
            data_dir: tempfile::tempdir()?,
        })
    }

    fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("seedsmith"));
        cmd.env("SEEDSMITH_CONFIG_DIR", self.cfg_dir.path())
            .env("SEEDSMITH_DATA_DIR", self.data_dir.path())
            .env_remove("SEEDSMITH_DEFAULT_NETWORK")
            .env_remove("SEEDSMITH_MNEMONIC_WORDS")
            .args(args);
        cmd
    }
}

fn stdout_json(out: &std::process::Output) -> eyre::Result<Value> {
    serde_json::from_slice(&out.stdout).context("parse stdout json")
}

fn stdout_frames(out: &std::process::Output) -> eyre::Result<Vec<Value>> {
    String::from_utf8(out.stdout.clone())?
        .lines()
        .map(|l| serde_json::from_str(l).context("parse frame"))
        .collect()
}

#[test]
fn encode_appends_path_and_password() -> eyre::Result<()> {
    let env = Env::new()?;
    let out = env
        .cmd(&["encode", "--path", "//polkadot///mypassword"])
        .write_stdin(format!("{DEV_PHRASE}\n"))
        .output()
        .context("run seedsmith encode")?;
    assert!(
        out.status.success(),
        "encode failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let v = stdout_json(&out)?;
    assert_eq!(
        v.get("suri").and_then(Value::as_str),
        Some(format!("{DEV_PHRASE}//polkadot///mypassword").as_str())
    );
    Ok(())
}

#[test]
fn encode_refuses_an_invalid_path() -> eyre::Result<()> {
    let env = Env::new()?;
    env.cmd(&["encode", "--path", "//a///pw1///pw2"])
        .write_stdin(format!("{DEV_PHRASE}\n"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("encode_failed"));
    Ok(())
}

#[test]
fn decode_hides_secrets_unless_revealed() -> eyre::Result<()> {
    let env = Env::new()?;
    let suri = format!("{DEV_PHRASE}//polkadot/0///mypassword\n");

    let out = env.cmd(&["decode"]).write_stdin(suri.clone()).output()?;
    assert!(out.status.success(), "decode failed");
    let v = stdout_json(&out)?;
    assert_eq!(v.get("path").and_then(Value::as_str), Some("//polkadot/0"));
    assert_eq!(v.get("has_password").and_then(Value::as_bool), Some(true));
    assert_eq!(v.get("phrase_words").and_then(Value::as_u64), Some(12));
    assert!(v.get("phrase").is_none(), "phrase printed without --reveal");

    let out = env.cmd(&["decode", "--reveal"]).write_stdin(suri).output()?;
    let v = stdout_json(&out)?;
    assert_eq!(v.get("phrase").and_then(Value::as_str), Some(DEV_PHRASE));
    assert_eq!(v.get("password").and_then(Value::as_str), Some("mypassword"));
    Ok(())
}

#[test]
fn decode_requires_a_phrase() -> eyre::Result<()> {
    let env = Env::new()?;
    env.cmd(&["decode"])
        .write_stdin("//polkadot\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("decode_failed"))
        .stderr(predicate::str::contains("SURI must begin with a phrase"));
    Ok(())
}

#[test]
fn validate_seed_reports_checksum_failures() -> eyre::Result<()> {
    let env = Env::new()?;
    let out = env
        .cmd(&["validate-seed", "--bip39"])
        .write_stdin(format!("{DEV_PHRASE}\n"))
        .output()?;
    assert!(out.status.success(), "valid phrase rejected");
    let v = stdout_json(&out)?;
    assert_eq!(v.get("type").and_then(Value::as_str), Some("bip39"));
    assert_eq!(v.get("valid").and_then(Value::as_bool), Some(true));

    let broken = DEV_PHRASE.replace("walk", "wall");
    let out = env
        .cmd(&["validate-seed", "--bip39"])
        .write_stdin(broken)
        .output()?;
    assert!(!out.status.success(), "broken checksum accepted");
    let v = stdout_json(&out)?;
    assert_eq!(v.get("valid").and_then(Value::as_bool), Some(false));
    assert_eq!(
        v.get("reason").and_then(Value::as_str),
        Some("invalid mnemonic checksum")
    );
    Ok(())
}

#[test]
fn parse_path_lists_issues() -> eyre::Result<()> {
    let env = Env::new()?;
    let out = env.cmd(&["parse-path", "//a///pw1///pw2"]).output()?;
    assert!(!out.status.success(), "duplicate password accepted");
    let v = stdout_json(&out)?;
    assert_eq!(v.get("valid").and_then(Value::as_bool), Some(false));
    let kinds: Vec<&str> = v
        .get("issues")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(|i| i.get("kind")?.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(kinds, vec!["duplicate_password"]);

    env.cmd(&["parse-path"])
        .write_stdin("//polkadot/0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""path":"//polkadot/0""#));
    Ok(())
}

#[test]
fn networks_lists_builtins() -> eyre::Result<()> {
    let env = Env::new()?;
    let out = env.cmd(&["networks"]).output()?;
    assert!(out.status.success(), "networks failed");
    let v = stdout_json(&out)?;
    let titles: Vec<&str> = v
        .as_array()
        .map(|a| a.iter().filter_map(|n| n.get("title")?.as_str()).collect())
        .unwrap_or_default();
    assert!(titles.contains(&"Polkadot"), "titles: {titles:?}");
    assert!(titles.contains(&"Ethereum"), "titles: {titles:?}");
    assert!(env.cfg_dir.path().join("config.toml").exists());
    Ok(())
}

#[test]
fn new_session_hands_off_ethereum_seed_verbatim() -> eyre::Result<()> {
    let env = Env::new()?;
    let input = concat!(
        r#"{"event":"path","value":"//ignored"}"#,
        "\n",
        r#"{"event":"generated","new_address":"0x00000000000000000000000000000000000000aa","is_bip39":false,"new_seed":"0xabc123"}"#,
        "\n",
        r#"{"event":"next"}"#,
        "\n",
    );
    let out = env
        .cmd(&["new", "--network", "ethereum"])
        .write_stdin(input)
        .output()?;
    assert!(
        out.status.success(),
        "session failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let frames = stdout_frames(&out)?;
    assert_eq!(
        frames
            .get(1)
            .and_then(|f| f.get("outcome"))
            .and_then(Value::as_str),
        Some("ignored")
    );
    let handoff = frames
        .last()
        .and_then(|f| f.get("handoff"))
        .ok_or_else(|| eyre::eyre!("no handoff frame"))?;
    assert_eq!(
        handoff.pointer("/draft/seed").and_then(Value::as_str),
        Some("0xabc123")
    );
    assert_eq!(
        handoff.get("network_title").and_then(Value::as_str),
        Some("Ethereum")
    );
    Ok(())
}

#[test]
fn new_session_encodes_suri_for_substrate() -> eyre::Result<()> {
    let env = Env::new()?;
    let generated = serde_json::json!({
        "event": "generated",
        "new_address": "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY",
        "is_bip39": true,
        "new_seed": DEV_PHRASE,
    });
    let input = format!(
        "{}\n{}\n{}\n",
        r#"{"event":"path","value":"//polkadot///mypassword"}"#,
        generated,
        r#"{"event":"next"}"#,
    );
    let out = env
        .cmd(&["new", "--network", "polkadot"])
        .write_stdin(input)
        .output()?;
    assert!(out.status.success(), "session failed");
    let frames = stdout_frames(&out)?;
    let handoff = frames
        .last()
        .and_then(|f| f.get("handoff"))
        .ok_or_else(|| eyre::eyre!("no handoff frame"))?;
    assert_eq!(
        handoff.pointer("/draft/seed").and_then(Value::as_str),
        Some(format!("{DEV_PHRASE}//polkadot///mypassword").as_str())
    );
    assert_eq!(
        handoff.pointer("/draft/seed_phrase").and_then(Value::as_str),
        Some(DEV_PHRASE)
    );
    Ok(())
}

#[test]
fn new_session_with_preview_generator_and_unknown_network() -> eyre::Result<()> {
    let env = Env::new()?;
    let out = env
        .cmd(&["new", "--network", "westend"])
        .write_stdin("{\"event\":\"generate\"}\n{\"event\":\"next\"}\n")
        .output()?;
    assert!(out.status.success(), "session failed");
    let frames = stdout_frames(&out)?;
    let seed = frames
        .last()
        .and_then(|f| f.pointer("/handoff/draft/seed"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    assert_eq!(seed.split(' ').count(), 24, "default mnemonic length");

    env.cmd(&["new", "--network", "atlantis"])
        .write_stdin("")
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown_network"));
    Ok(())
}
