//! Remote-store adapter over a WebDAV server.
//!
//! One `SyncClient` is bound to a single server and set of credentials and
//! performs a strictly sequential series of remote calls per operation.
//! A directory that does not exist on the server is treated as empty on
//! the read path and as already deleted on the delete path.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::{debug, warn};
use percent_encoding::percent_decode_str;
use reqwest_dav::list_cmd::ListEntity;
use reqwest_dav::{Auth, ClientBuilder, DecodeError, Depth, Error as DavError};
use serde::{Deserialize, Serialize};

/// Directory used by fetch when no name is given.
pub const DEFAULT_DIRECTORY: &str = "tabby-config";

/// A named configuration file, exchanged as JSON with the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub name: String,
    pub content: String,
}

/// Validated connection parameters for one server.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub url: String,
    pub username: String,
    pub password: String,
}

/// WebDAV client bound to a single server.
pub struct SyncClient {
    client: reqwest_dav::Client,
}

impl SyncClient {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let client = ClientBuilder::new()
            .set_host(credentials.url.trim_end_matches('/').to_string())
            .set_auth(Auth::Basic(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build()
            .context("failed to build WebDAV client")?;
        Ok(Self { client })
    }

    /// Fetch every file in `dir`, defaulting the directory name when empty.
    ///
    /// Entries that cannot be read are skipped; only the skip count is
    /// reported, as a warning.
    pub async fn fetch(&self, dir: &str) -> Result<Vec<ConfigFile>> {
        let dir = if dir.is_empty() { DEFAULT_DIRECTORY } else { dir };

        let entries = match self.client.list(dir, Depth::Number(1)).await {
            Ok(entries) => entries,
            // Absent until the first upload, not an error
            Err(err) if is_not_found(&err) => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to list directory {dir}"))
            }
        };

        let mut files = Vec::new();
        let mut skipped = 0usize;
        for entry in entries {
            // Depth 1 lists the collection itself along with any
            // sub-directories; only plain files are fetched.
            let ListEntity::File(file) = entry else {
                continue;
            };
            let Some(name) = file_name(&file.href) else {
                skipped += 1;
                continue;
            };
            match self.read_file(dir, &name).await {
                Ok(content) => files.push(ConfigFile { name, content }),
                Err(err) => {
                    debug!("skipping unreadable file {name}: {err:#}");
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            warn!("skipped {skipped} unreadable entries in {dir}");
        }

        Ok(files)
    }

    async fn read_file(&self, dir: &str, name: &str) -> Result<String> {
        let response = self.client.get(&format!("{dir}/{name}")).await?;
        Ok(response.text().await?)
    }

    /// Upload `files` into `dir`, creating the directory first.
    ///
    /// Returns the directory name actually used: an empty `dir` selects a
    /// fresh timestamped name. Files are written in input order with no
    /// atomicity across them, and the first failing write aborts the rest.
    pub async fn upload(&self, dir: &str, files: &[ConfigFile]) -> Result<String> {
        let dir = if dir.is_empty() {
            generated_directory_name()
        } else {
            dir.to_string()
        };

        self.mkdir_all(&dir)
            .await
            .with_context(|| format!("failed to create directory {dir}"))?;

        for file in files {
            self.client
                .put(&format!("{}/{}", dir, file.name), file.content.clone())
                .await
                .with_context(|| format!("failed to write file {}", file.name))?;
        }

        Ok(dir)
    }

    /// Idempotent MKCOL walk over every path segment.
    async fn mkdir_all(&self, dir: &str) -> Result<()> {
        let mut path = String::new();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            path.push('/');
            path.push_str(segment);
            match self.client.mkcol(&path).await {
                Ok(()) => {}
                Err(err) if is_already_present(&err) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Delete `dir` and the files directly inside it.
    ///
    /// A directory that does not exist counts as already deleted. Files
    /// that fail to delete are left behind without failing the operation;
    /// the trailing removal of the directory itself is fatal on failure.
    /// Sub-directories are not recursed into, so the trailing removal can
    /// fail when nested collections remain.
    pub async fn delete(&self, dir: &str) -> Result<()> {
        if dir.is_empty() {
            bail!("directory name is required");
        }

        let entries = match self.client.list(dir, Depth::Number(1)).await {
            Ok(entries) => entries,
            Err(err) if is_not_found(&err) => return Ok(()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to list directory {dir}"))
            }
        };

        let mut skipped = 0usize;
        for entry in entries {
            let ListEntity::File(file) = entry else {
                continue;
            };
            let Some(name) = file_name(&file.href) else {
                continue;
            };
            if let Err(err) = self.client.delete(&format!("{dir}/{name}")).await {
                debug!("failed to delete {dir}/{name}: {err:#}");
                skipped += 1;
            }
        }
        if skipped > 0 {
            warn!("left {skipped} files behind in {dir}");
        }

        self.client
            .delete(dir)
            .await
            .with_context(|| format!("failed to remove directory {dir}"))
    }
}

fn generated_directory_name() -> String {
    format!("{}-{}", DEFAULT_DIRECTORY, Utc::now().timestamp())
}

/// Last path segment of a PROPFIND href, percent-decoded.
fn file_name(href: &str) -> Option<String> {
    let segment = href.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(percent_decode_str(segment).decode_utf8_lossy().into_owned())
}

/// Whether the server reported the target as absent.
///
/// Inspects the structured error rather than the rendered message, so the
/// check is independent of the transport's error text.
fn is_not_found(err: &DavError) -> bool {
    status_code(err) == Some(404)
}

/// MKCOL on an existing collection answers 405 Method Not Allowed.
fn is_already_present(err: &DavError) -> bool {
    status_code(err) == Some(405)
}

fn status_code(err: &DavError) -> Option<u16> {
    match err {
        DavError::Decode(DecodeError::Server(err)) => Some(err.response_code),
        DavError::Decode(DecodeError::StatusMismatched(err)) => Some(err.response_code),
        DavError::Reqwest(err) => err.status().map(|status| status.as_u16()),
        _ => None,
    }
}
