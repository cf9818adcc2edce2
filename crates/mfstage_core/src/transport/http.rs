//! Transport adapter over the daemon's HTTP RPC API.

use super::{is_missing_message, Link, LinkKind, Transport};
use crate::config::TransportKind;
use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use crate::path::MfsPath;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistent client for the RPC API (`/api/v0/...`).
///
/// Every endpoint is a POST; arguments travel in the query string and file
/// content in a multipart body.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: String,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Deserialize)]
struct StatResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Deserialize)]
struct LsResponse {
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

/// unixfs type code for directories in `ls` output.
const LS_TYPE_DIRECTORY: u8 = 1;

impl HttpTransport {
    /// Creates a client for the API at `api_url` (e.g. `http://127.0.0.1:5001`).
    pub fn new(api_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StageError::ConfigError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base: format!("{}/api/v0", api_url.trim_end_matches('/')),
        })
    }

    async fn call(
        &self,
        op: &'static str,
        query: &[(&str, &str)],
        form: Option<Form>,
    ) -> Result<reqwest::Response> {
        debug!(op, ?query, "api call");

        let mut request = self
            .client
            .post(format!("{}/{}", self.base, op))
            .query(query);
        if let Some(form) = form {
            request = request.multipart(form);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StageError::transport(op, e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("HTTP {}: {}", status, body.trim()));
        Err(StageError::transport(op, message))
    }

    async fn bytes(&self, op: &'static str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let response = self.call(op, query, None).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| StageError::transport(op, e.to_string()))
    }

    async fn add_form(local: &Path, recursive: bool) -> Result<Form> {
        let meta = tokio::fs::metadata(local)
            .await
            .map_err(|e| StageError::local_io(local, e))?;

        if !meta.is_dir() {
            let data = tokio::fs::read(local)
                .await
                .map_err(|e| StageError::local_io(local, e))?;
            let name = local
                .file_name()
                .map(|n| encode_part_name(&n.to_string_lossy()))
                .unwrap_or_else(|| "file".to_string());
            return Ok(Form::new().part("file", file_part(data, name)?));
        }

        if !recursive {
            return Err(StageError::IsADirectory(local.display().to_string()));
        }

        let root = local.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || collect_tree(&root))
            .await
            .map_err(|e| StageError::transport("add", format!("blocking task failed: {}", e)))??;

        let mut form = Form::new();
        for (path, name, is_dir) in entries {
            let part = if is_dir {
                Part::bytes(Vec::new())
                    .file_name(name)
                    .mime_str("application/x-directory")
                    .map_err(|e| StageError::transport("add", e.to_string()))?
            } else {
                let data = tokio::fs::read(&path)
                    .await
                    .map_err(|e| StageError::local_io(&path, e))?;
                file_part(data, name)?
            };
            form = form.part("file", part);
        }
        Ok(form)
    }
}

fn file_part(data: Vec<u8>, name: String) -> Result<Part> {
    Part::bytes(data)
        .file_name(name)
        .mime_str("application/octet-stream")
        .map_err(|e| StageError::transport("add", e.to_string()))
}

/// Bytes left as-is in a multipart file name. The daemon query-unescapes
/// names, so `+` and `%` must travel encoded.
const PART_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_part_name(component: &str) -> String {
    utf8_percent_encode(component, PART_NAME).to_string()
}

/// Lists a directory tree as (local path, multipart name, is_dir), parents
/// first. Names are relative to the tree's parent so the root directory is
/// the last entry the daemon reports.
fn collect_tree(root: &Path) -> Result<Vec<(PathBuf, String, bool)>> {
    let base = root.parent().unwrap_or(root);
    let mut out = Vec::new();

    for entry in walkdir::WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            StageError::local_io(path, std::io::Error::other(e.to_string()))
        })?;
        let rel = entry.path().strip_prefix(base).unwrap_or(entry.path());
        let name = rel
            .components()
            .map(|c| encode_part_name(&c.as_os_str().to_string_lossy()))
            .collect::<Vec<_>>()
            .join("/");
        out.push((entry.path().to_path_buf(), name, entry.file_type().is_dir()));
    }

    Ok(out)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn stat(&self, path: &MfsPath) -> Result<Option<ContentHash>> {
        match self
            .call("files/stat", &[("arg", path.as_str()), ("hash", "true")], None)
            .await
        {
            Ok(response) => {
                let stat: StatResponse = response
                    .json()
                    .await
                    .map_err(|e| StageError::transport("files/stat", e.to_string()))?;
                ContentHash::parse(&stat.hash).map(Some)
            }
            Err(StageError::Transport { message, .. }) if is_missing_message(&message) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn read(&self, path: &MfsPath) -> Result<Vec<u8>> {
        match self.bytes("files/read", &[("arg", path.as_str())]).await {
            Err(StageError::Transport { message, .. }) if is_missing_message(&message) => {
                Err(StageError::NotFound(path.to_string()))
            }
            other => other,
        }
    }

    async fn write(&self, path: &MfsPath, data: Vec<u8>, create: bool) -> Result<()> {
        let name = path.file_name().unwrap_or("data").to_string();
        let form = Form::new().part("file", file_part(data, name)?);
        let create = if create { "true" } else { "false" };
        self.call(
            "files/write",
            &[
                ("arg", path.as_str()),
                ("create", create),
                ("truncate", "true"),
            ],
            Some(form),
        )
        .await
        .map(|_| ())
    }

    async fn mkdir(&self, path: &MfsPath, parents: bool) -> Result<()> {
        let parents = if parents { "true" } else { "false" };
        self.call(
            "files/mkdir",
            &[("arg", path.as_str()), ("parents", parents)],
            None,
        )
        .await
        .map(|_| ())
    }

    async fn remove(&self, path: &MfsPath, recursive: bool) -> Result<()> {
        let recursive = if recursive { "true" } else { "false" };
        self.call(
            "files/rm",
            &[("arg", path.as_str()), ("recursive", recursive)],
            None,
        )
        .await
        .map(|_| ())
    }

    async fn copy(&self, src: &ContentHash, dst: &MfsPath) -> Result<()> {
        let src = src.immutable_path();
        self.call("files/cp", &[("arg", src.as_str()), ("arg", dst.as_str())], None)
            .await
            .map(|_| ())
    }

    async fn add(&self, local: &Path, recursive: bool) -> Result<ContentHash> {
        let form = Self::add_form(local, recursive).await?;
        let recursive = if recursive { "true" } else { "false" };
        let response = self
            .call("add", &[("recursive", recursive), ("pin", "true")], Some(form))
            .await?;
        let body = response
            .text()
            .await
            .map_err(|e| StageError::transport("add", e.to_string()))?;

        // One JSON object per ingested entry; the root comes last.
        let last = body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .last()
            .ok_or_else(|| StageError::transport("add", "empty response"))?;
        let entry: AddResponse =
            serde_json::from_str(last).map_err(|e| StageError::transport("add", e.to_string()))?;
        debug!(name = %entry.name, hash = %entry.hash, "added");
        ContentHash::parse(&entry.hash)
    }

    async fn cat(&self, hash: &ContentHash) -> Result<Vec<u8>> {
        self.bytes("cat", &[("arg", hash.as_str())]).await
    }

    async fn ls(&self, hash: &ContentHash) -> Result<Vec<Link>> {
        let response = self
            .call(
                "ls",
                &[("arg", hash.as_str()), ("resolve-type", "true"), ("size", "false")],
                None,
            )
            .await?;
        let listing: LsResponse = response
            .json()
            .await
            .map_err(|e| StageError::transport("ls", e.to_string()))?;

        listing
            .objects
            .into_iter()
            .flat_map(|object| object.links)
            .map(|link| {
                Ok(Link {
                    name: link.name,
                    hash: ContentHash::parse(&link.hash)?,
                    kind: if link.kind == LS_TYPE_DIRECTORY {
                        LinkKind::Directory
                    } else {
                        LinkKind::File
                    },
                })
            })
            .collect()
    }

    async fn health_probe(&self) -> bool {
        self.call("version", &[], None).await.is_ok()
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Api
    }
}
