#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, ExitStatus, Stdio};

use assert_cmd::Command;
use assert_cmd::cargo_bin_cmd;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Environment variables the binary reads; cleared so the host's values never leak in
const FAMILIAR_ENV: [&str; 5] = [
    "CLAUDE_DIR",
    "NOTEBOOK_NAME",
    "OPENAI_API_KEY",
    "GITHUB_PERSONAL_ACCESS_TOKEN",
    "RUST_LOG",
];

/// Stand-in for `nb`: answers from canned output and logs every call
pub const FAKE_NB: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/nb.log"
case "$1" in
  *:list)
    printf '[2] two.md · "Two"\n[1] one.md · "One"\n'
    ;;
  *:show)
    for last; do :; done
    if [ "$last" = "99" ]; then
      echo "Not found: 99" >&2
      exit 1
    fi
    case "$*" in
      *--info*) printf '[work:1] one.md · "One"\n' ;;
      *--updated*) printf '2025-04-28 17:30:19\n' ;;
      *) printf '# One\n\nbody text\n' ;;
    esac
    ;;
  *:add)
    printf 'Added: [3] three.md\n'
    ;;
  *:search)
    printf '[work:2] two.md · "Two"\n[other] garbage\n'
    ;;
  *)
    echo "unknown command: $1" >&2
    exit 2
    ;;
esac
"#;

/// A scratch workspace holding fake programs and a config file
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".claude")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn claude_dir(&self) -> PathBuf {
        self.path().join(".claude")
    }

    /// Write an executable shell script and return its path
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, body).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// Write `familiar.toml` pointing at this sandbox's fake programs
    pub fn config(&self, extra: &str) -> PathBuf {
        let path = self.path().join("familiar.toml");
        let body = format!(
            "notebook = \"work\"\nclaude_dir = {:?}\nnb_program = {:?}\nhost_program = {:?}\n{}",
            self.claude_dir().display().to_string(),
            self.path().join("nb").display().to_string(),
            self.path().join("claude").display().to_string(),
            extra
        );
        fs::write(&path, body).unwrap();
        path
    }

    /// Lines a fake program appended to `<name>.log`
    pub fn log(&self, name: &str) -> Vec<String> {
        let path = self.path().join(format!("{}.log", name));
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// The binary with a clean environment, run from inside the sandbox
    pub fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("familiar");
        for key in FAMILIAR_ENV {
            cmd.env_remove(key);
        }
        cmd.env("HOME", self.path()).current_dir(self.path());
        cmd
    }

    /// The binary as a long-running child with piped stdio
    pub fn spawn(&self, args: &[&str], envs: &[(&str, &str)]) -> Child {
        let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_familiar"));
        for key in FAMILIAR_ENV {
            cmd.env_remove(key);
        }
        cmd.env("HOME", self.path())
            .current_dir(self.path())
            .envs(envs.iter().copied())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd.spawn().unwrap()
    }
}

/// A client connection to a running server, past the initialize handshake
pub struct McpSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    next_id: i64,
    /// Result of the `initialize` request
    pub info: Value,
}

impl McpSession {
    pub fn start(mut child: Child) -> Self {
        let stdin = child.stdin.take().unwrap();
        let stdout = BufReader::new(child.stdout.take().unwrap());
        let mut session = Self {
            child,
            stdin: Some(stdin),
            stdout,
            next_id: 1,
            info: Value::Null,
        };

        let init = session.request(
            "initialize",
            json!({
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": { "name": "familiar-tests", "version": "0" }
            }),
        );
        session.info = init["result"].clone();
        session.send(&json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }));
        session
    }

    pub fn send(&mut self, message: &Value) {
        let stdin = self.stdin.as_mut().unwrap();
        writeln!(stdin, "{}", message).unwrap();
        stdin.flush().unwrap();
    }

    /// Send a request and wait for the response carrying its id
    pub fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        self.send(&json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }));

        loop {
            let mut line = String::new();
            let read = self.stdout.read_line(&mut line).unwrap();
            assert!(read > 0, "server closed stdout before answering {}", method);
            if line.trim().is_empty() {
                continue;
            }
            let message: Value = serde_json::from_str(&line).unwrap();
            if message["id"] == Value::from(id) {
                return message;
            }
        }
    }

    pub fn call(&mut self, name: &str, arguments: Value) -> Value {
        self.request("tools/call", json!({ "name": name, "arguments": arguments }))
    }

    /// Close stdin and wait for the server to exit
    pub fn finish(mut self) -> ExitStatus {
        drop(self.stdin.take());
        self.child.wait().unwrap()
    }
}
