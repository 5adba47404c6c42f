//! Transport selection for the server binary.
//!
//! The server speaks MCP over stdio by default, which is how desktop hosts
//! launch it. `--transport http` serves the same handler over rmcp's
//! streamable HTTP transport under `/mcp` instead.
//!
//! ```ignore
//! #[derive(clap::Parser)]
//! struct Args {
//!     #[command(flatten)]
//!     transport: TransportArgs,
//! }
//!
//! let transport = Transport::from(Args::parse().transport);
//! ```

use crate::config::DEFAULT_PORT;
use clap::{Args, ValueEnum};
use std::fmt;

/// Where the server reads requests from and writes responses to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP on `0.0.0.0:<port>/mcp`. Port 0 picks a free port.
    Http { port: u16 },
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => f.write_str("stdio"),
            Transport::Http { port } => write!(f, "http (port {})", port),
        }
    }
}

/// `--transport` values, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    #[default]
    Stdio,
    Http,
}

/// Transport flags, meant to be `#[command(flatten)]`ed into a binary's args.
#[derive(Args, Debug, Clone)]
pub struct TransportArgs {
    /// Transport mode
    #[arg(long, value_enum, ignore_case = true, default_value = "stdio")]
    pub transport: TransportMode,

    /// Port for the HTTP transport; ignored for stdio
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Default for TransportArgs {
    fn default() -> Self {
        Self {
            transport: TransportMode::Stdio,
            port: DEFAULT_PORT,
        }
    }
}

impl From<TransportArgs> for Transport {
    fn from(args: TransportArgs) -> Self {
        match args.transport {
            TransportMode::Stdio => Transport::Stdio,
            TransportMode::Http => Transport::Http { port: args.port },
        }
    }
}
