//! # Token Subcommands
//!
//! Key generation and token encode/decode, wrapping [`sds_core::IdCodec`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use sds_core::{IdCodec, InternalId};
use zeroize::Zeroizing;

/// Codec key arguments shared by `encode` and `decode`.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Primary codec key (URL-safe base64, 32 bytes).
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub key: String,

    /// Retired codec keys still accepted when decoding (comma-separated).
    #[arg(
        long = "retired-key",
        env = "SECRET_KEY_RETIRED",
        value_delimiter = ',',
        hide_env_values = true
    )]
    pub retired: Vec<String>,
}

impl KeyArgs {
    fn codec(&self) -> Result<IdCodec> {
        let retired: Vec<&str> = self
            .retired
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        IdCodec::with_retired(&self.key, &retired).context("failed to load codec key")
    }
}

/// Arguments for `sds keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the key to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments for `sds encode`.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Internal SDS id.
    #[arg(value_name = "ID")]
    pub id: u64,
}

/// Arguments for `sds decode`.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Identifier token.
    #[arg(value_name = "TOKEN")]
    pub token: String,
}

/// Execute `sds keygen`.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let key = IdCodec::generate_key();
    match &args.output {
        Some(path) => {
            write_key(path, &key)?;
            println!("OK: wrote codec key to {}", path.display());
        }
        None => println!("{}", key.as_str()),
    }
    Ok(0)
}

/// Execute `sds encode`.
pub fn run_encode(args: &EncodeArgs) -> Result<u8> {
    println!("{}", encode(&args.key, args.id)?);
    Ok(0)
}

/// Execute `sds decode`. Exits with 1 when the token does not decode.
pub fn run_decode(args: &DecodeArgs) -> Result<u8> {
    match decode(&args.key, &args.token) {
        Ok(id) => {
            println!("{id}");
            Ok(0)
        }
        Err(e) => {
            eprintln!("FAIL: {e:#}");
            Ok(1)
        }
    }
}

fn encode(key: &KeyArgs, id: u64) -> Result<String> {
    Ok(key.codec()?.encode(InternalId::new(id)).into_inner())
}

fn decode(key: &KeyArgs, token: &str) -> Result<u64> {
    let codec = key.codec()?;
    let id = codec
        .decode(token.trim())
        .context("token does not decode under the configured keys")?;
    tracing::debug!(id = id.get(), "decoded token");
    Ok(id.get())
}

fn write_key(path: &Path, key: &Zeroizing<String>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, key.as_bytes())
        .with_context(|| format!("failed to write codec key: {}", path.display()))
}
