//! CLI parse and destination-resolution tests.

use super::{resolve_dest, Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}
