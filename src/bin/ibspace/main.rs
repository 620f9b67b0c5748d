use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};

mod cli;
mod cmd_alloc;
mod cmd_check;
mod cmd_init;
mod cmd_status;
mod util;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт: info.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Init { space } => cmd_init::exec(&space.files),

        cli::Cmd::Status { space, json } => cmd_status::exec(&space.files, json),

        cli::Cmd::Check { space, json } => cmd_check::exec(&space.files, json),

        cli::Cmd::Alloc { space, count } => cmd_alloc::exec_alloc(&space.files, count),

        cli::Cmd::Free { space, page } => cmd_alloc::exec_free(&space.files, page),
    }
}
