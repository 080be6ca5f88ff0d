use crate::cli::{Args, Process};
use crate::helpers::fmt_error;
use clap::{Command, CommandFactory, Parser};
use clap_complete::{Generator, generate};
use std::io;

pub mod cli;
pub mod commands;
pub mod config;
pub mod helpers;
pub mod logging;
#[cfg(test)]
mod memory;
pub mod purge;
pub mod s3;
pub mod store;

pub use config::{ConfigError, PurgeConfig, StaticCredentials, purge_with_config};
pub use purge::{DeletionBatch, PurgeError, PurgeReport, PurgeTarget, purge};
pub use s3::S3Store;
pub use store::{ListingPage, MAX_KEYS, ObjectStore, ObjectVersionRef, PageCursor, StoreError};

pub fn print_completions<G: Generator>(
    generator: G,
    cmd: &mut Command,
) {
    // get_name returns a str, to_owned = to_string (but restriction::str_to_string)
    generate(generator, cmd, cmd.get_name().to_owned(), &mut io::stdout());
}

/// Runs the command line tool and returns its exit code.
pub async fn main_rs() -> i32 {
    let args = Args::parse();

    if let Some(generator) = args.generator {
        let mut cmd = Args::command();

        print_completions(generator, &mut cmd);
        return 0;
    }

    logging::init(args.log_level);

    args.process().await.unwrap_or_else(|err| {
        eprintln!("{}", fmt_error(&err));
        1
    })
}
