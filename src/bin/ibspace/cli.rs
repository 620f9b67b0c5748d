use clap::{Args, Parser, Subcommand};

/// Admin CLI for the system tablespace
#[derive(Parser, Debug)]
#[command(name = "ibspace", version, about = "System tablespace admin CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Data files of the system tablespace, in order.
#[derive(Args, Debug)]
pub struct SpaceArgs {
    /// PATH:SIZE_PAGES[:auto[=INC_PAGES]]; repeat for each file
    #[arg(long = "file", required = true, value_name = "SPEC")]
    pub files: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create (or open) the system tablespace and close it
    Init {
        #[command(flatten)]
        space: SpaceArgs,
    },
    /// Print header fields, nodes and allocator state
    Status {
        #[command(flatten)]
        space: SpaceArgs,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Verify the header page checksum and invariants (read-only)
    Check {
        #[command(flatten)]
        space: SpaceArgs,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Allocate pages and persist
    Alloc {
        #[command(flatten)]
        space: SpaceArgs,
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Free a page and persist
    Free {
        #[command(flatten)]
        space: SpaceArgs,
        #[arg(long)]
        page: u32,
    },
}
