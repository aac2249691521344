use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use serde_json::json;

use crate::cli::{Commands, ConnectionArgs};
use crate::webdav::{ConfigFile, Credentials, SyncClient};

pub fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::FetchFiles(args) => fetch_files(args),
        Commands::UploadFiles(args) => upload_files(args),
        Commands::DeleteDirectory(args) => delete_directory(args),
    }
}

fn fetch_files(args: ConnectionArgs) -> Result<()> {
    let client = SyncClient::new(&credentials(&args)?)?;

    let files = tokio::runtime::Runtime::new()?
        .block_on(async { client.fetch(&args.directory).await })?;

    emit(&json!({ "success": true, "files": files }))
}

fn upload_files(args: ConnectionArgs) -> Result<()> {
    let credentials = credentials(&args)?;
    let files = read_files(io::stdin().lock())?;

    let client = SyncClient::new(&credentials)?;
    let directory = tokio::runtime::Runtime::new()?
        .block_on(async { client.upload(&args.directory, &files).await })?;

    emit(&json!({ "success": true, "directory": directory }))
}

fn delete_directory(args: ConnectionArgs) -> Result<()> {
    let credentials = credentials(&args)?;
    if args.directory.is_empty() {
        bail!("directory name is required");
    }

    let client = SyncClient::new(&credentials)?;
    tokio::runtime::Runtime::new()?.block_on(async { client.delete(&args.directory).await })?;

    emit(&json!({ "success": true }))
}

/// Resolve the connection flags into a validated credentials record.
///
/// A combined token is only consulted when neither --username nor
/// --password is given, and splits at the first ':' so passwords may
/// contain colons.
fn credentials(args: &ConnectionArgs) -> Result<Credentials> {
    let (mut username, mut password) = (args.username.clone(), args.password.clone());
    if username.is_empty() && password.is_empty() && !args.token.is_empty() {
        let (user, pass) = split_token(&args.token);
        username = user.to_string();
        password = pass.to_string();
    }

    if args.url.is_empty() {
        bail!("server URL is required");
    }
    if username.is_empty() || password.is_empty() {
        bail!("username and password are required");
    }

    Ok(Credentials {
        url: args.url.clone(),
        username,
        password,
    })
}

fn split_token(token: &str) -> (&str, &str) {
    match token.split_once(':') {
        Some((user, pass)) => (user, pass),
        None => (token, ""),
    }
}

fn read_files(reader: impl Read) -> Result<Vec<ConfigFile>> {
    serde_json::from_reader(reader).context("failed to parse input")
}

fn emit(value: &serde_json::Value) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
