//! # sds-cli — Operator CLI for the SDS Gateway
//!
//! Provides the `sds` command-line interface for support tasks around the
//! identifier codec.
//!
//! ## Subcommands
//!
//! - `sds keygen` — Generate a fresh codec key for `SECRET_KEY`.
//! - `sds encode <id>` — Mint the token a caller would see for an id.
//! - `sds decode <token>` — Recover the id behind a token a caller reported.
//!
//! The key is taken from `--key` or the `SECRET_KEY` environment variable;
//! `decode` also honours `SECRET_KEY_RETIRED`.
//!
//! ```bash
//! export SECRET_KEY=$(sds keygen)
//! sds encode 42
//! sds decode gAAAAABl...
//! ```

pub mod token;
