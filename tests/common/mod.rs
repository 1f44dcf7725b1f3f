//! Shared helpers for CLI integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Command for the built binary with logging kept off stdout.
pub fn qsurvey() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_qsurvey"));
    command.env_remove("QSURVEY_RESPONDER").env("RUST_LOG", "warn");
    command
}

/// Responder command string running the mock subject through `sh`.
pub fn mock_responder() -> String {
    let script = manifest_dir().join("tests/mock-responder.sh");
    format!("sh {}", shell_words::quote(&script.display().to_string()))
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents.as_bytes()).expect("write file");
}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout is UTF-8")
}

pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
