//! Transport adapter that shells out to the daemon's CLI.

use super::{is_missing_message, Link, LinkKind, Transport};
use crate::config::TransportKind;
use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use crate::path::MfsPath;
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Spawns one CLI process per call.
#[derive(Debug, Clone)]
pub struct CommandTransport {
    binary: PathBuf,
}

#[derive(Deserialize)]
struct LsOutput {
    #[serde(rename = "Objects")]
    objects: Vec<LsObject>,
}

#[derive(Deserialize)]
struct LsObject {
    #[serde(rename = "Links", default)]
    links: Vec<LsLink>,
}

#[derive(Deserialize)]
struct LsLink {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Hash")]
    hash: String,
    #[serde(rename = "Type")]
    kind: u8,
}

impl CommandTransport {
    /// Uses `binary` (a name on `PATH` or a full path) for every call.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Runs the CLI with `args`, feeding `stdin` if given, and returns stdout.
    async fn run(
        &self,
        op: &'static str,
        args: Vec<OsString>,
        stdin: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        debug!(op, binary = %self.binary.display(), ?args, "spawning");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| StageError::transport(op, format!("failed to spawn {}: {}", self.binary.display(), e)))?;

        if let Some(data) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(&data)
                    .await
                    .map_err(|e| StageError::transport(op, e.to_string()))?;
                // Closing stdin signals end of input.
                drop(pipe);
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| StageError::transport(op, e.to_string()))?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim().trim_start_matches("Error:").trim().to_string();
            Err(StageError::transport(
                op,
                if message.is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    message
                },
            ))
        }
    }

    async fn run_hash(&self, op: &'static str, args: Vec<OsString>) -> Result<ContentHash> {
        let stdout = self.run(op, args, None).await?;
        let text = String::from_utf8_lossy(&stdout);
        let line = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .ok_or_else(|| StageError::transport(op, "no hash in output"))?;
        ContentHash::parse(line)
    }
}

fn args<const N: usize>(items: [&str; N]) -> Vec<OsString> {
    items.into_iter().map(OsString::from).collect()
}

#[async_trait]
impl Transport for CommandTransport {
    async fn stat(&self, path: &MfsPath) -> Result<Option<ContentHash>> {
        match self
            .run_hash("files/stat", args(["files", "stat", "--hash", path.as_str()]))
            .await
        {
            Ok(hash) => Ok(Some(hash)),
            Err(StageError::Transport { message, .. }) if is_missing_message(&message) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn read(&self, path: &MfsPath) -> Result<Vec<u8>> {
        match self
            .run("files/read", args(["files", "read", path.as_str()]), None)
            .await
        {
            Err(StageError::Transport { message, .. }) if is_missing_message(&message) => {
                Err(StageError::NotFound(path.to_string()))
            }
            other => other,
        }
    }

    async fn write(&self, path: &MfsPath, data: Vec<u8>, create: bool) -> Result<()> {
        let mut argv = args(["files", "write", "--truncate"]);
        if create {
            argv.push("--create".into());
        }
        argv.push(path.as_str().into());
        self.run("files/write", argv, Some(data)).await.map(|_| ())
    }

    async fn mkdir(&self, path: &MfsPath, parents: bool) -> Result<()> {
        let mut argv = args(["files", "mkdir"]);
        if parents {
            argv.push("-p".into());
        }
        argv.push(path.as_str().into());
        self.run("files/mkdir", argv, None).await.map(|_| ())
    }

    async fn remove(&self, path: &MfsPath, recursive: bool) -> Result<()> {
        let mut argv = args(["files", "rm"]);
        if recursive {
            argv.push("-r".into());
        }
        argv.push(path.as_str().into());
        self.run("files/rm", argv, None).await.map(|_| ())
    }

    async fn copy(&self, src: &ContentHash, dst: &MfsPath) -> Result<()> {
        let src = src.immutable_path();
        self.run("files/cp", args(["files", "cp", src.as_str(), dst.as_str()]), None)
            .await
            .map(|_| ())
    }

    async fn add(&self, local: &Path, recursive: bool) -> Result<ContentHash> {
        let meta = tokio::fs::metadata(local)
            .await
            .map_err(|e| StageError::local_io(local, e))?;
        if meta.is_dir() && !recursive {
            return Err(StageError::IsADirectory(local.display().to_string()));
        }

        let mut argv = args(["add", "-Q", "--pin=true"]);
        if recursive {
            argv.push("-r".into());
        }
        argv.push(local.as_os_str().to_os_string());
        self.run_hash("add", argv).await
    }

    async fn cat(&self, hash: &ContentHash) -> Result<Vec<u8>> {
        self.run("cat", args(["cat", hash.as_str()]), None).await
    }

    async fn ls(&self, hash: &ContentHash) -> Result<Vec<Link>> {
        let stdout = self
            .run(
                "ls",
                args(["ls", "--resolve-type", "--size=false", "--enc=json", hash.as_str()]),
                None,
            )
            .await?;
        let output: LsOutput =
            serde_json::from_slice(&stdout).map_err(|e| StageError::transport("ls", e.to_string()))?;

        output
            .objects
            .into_iter()
            .flat_map(|o| o.links)
            .map(|link| {
                Ok(Link {
                    name: link.name,
                    hash: ContentHash::parse(&link.hash)?,
                    kind: if link.kind == 1 {
                        LinkKind::Directory
                    } else {
                        LinkKind::File
                    },
                })
            })
            .collect()
    }

    async fn health_probe(&self) -> bool {
        self.stat(&MfsPath::root())
            .await
            .map(|root| root.is_some())
            .unwrap_or(false)
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Command
    }
}
