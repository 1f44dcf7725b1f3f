//! Subject invocation for surveys.
//!
//! A responder receives the framed prompt for one player and one query and
//! returns the subject's free-form reply. The command-backed responder runs a
//! user-configured program with the prompt on stdin and reads the reply from
//! stdout, so any model wrapper or script can stand in for the subject.
//!
//! The command is resolved in priority order:
//! 1. `--responder` CLI flag
//! 2. `QSURVEY_RESPONDER` environment variable
use crate::query::QueryInstance;
use anyhow::{anyhow, Context, Result};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::time::Instant;

pub const RESPONDER_ENV: &str = "QSURVEY_RESPONDER";

pub trait Responder: Sync {
    fn respond(&self, player: &str, query: &QueryInstance, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct CommandResponder {
    argv: Vec<String>,
}

impl CommandResponder {
    pub fn parse(command: &str) -> Result<Self> {
        let argv = shell_words::split(command)
            .with_context(|| format!("parse responder command: {command}"))?;
        if argv.is_empty() {
            return Err(anyhow!("responder command is empty"));
        }
        Ok(Self { argv })
    }

    /// Resolve the command from the flag value, falling back to the env var.
    pub fn resolve(flag: Option<&str>) -> Result<Self> {
        if let Some(command) = flag {
            return Self::parse(command);
        }
        match std::env::var(RESPONDER_ENV) {
            Ok(command) => Self::parse(&command).with_context(|| format!("parse {RESPONDER_ENV}")),
            Err(_) => Err(anyhow!(
                "no responder configured: pass --responder or set {RESPONDER_ENV}"
            )),
        }
    }
}

impl Responder for CommandResponder {
    fn respond(&self, player: &str, query: &QueryInstance, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let mut child = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .env("QSURVEY_PLAYER", player)
            .env("QSURVEY_QUERY_TYPE", &query.query_type)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn responder command: {}", self.argv[0]))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(prompt.as_bytes()) {
                // A responder may answer without reading the prompt and exit first.
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                    tracing::debug!(player, index = %query.index, "responder closed stdin early");
                }
                result => result.context("write prompt to responder stdin")?,
            }
        }

        let output = child
            .wait_with_output()
            .context("wait for responder command")?;
        let elapsed_ms = start.elapsed().as_millis();

        tracing::info!(
            elapsed_ms,
            player,
            index = %query.index,
            prompt_bytes = prompt.len(),
            response_bytes = output.stdout.len(),
            "responder invoke complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "responder command failed with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        String::from_utf8(output.stdout).context("decode responder stdout as UTF-8")
    }
}
