// src/main.rs
mod biometric;
mod cli;
mod config;
mod crypto;
mod error;
mod export;
mod gate;
mod kv;
mod models;
mod settings;
mod store;
mod validation;

use clap::Parser;

fn main() {
    env_logger::init();
    log::info!("Starting NoteVault");

    let cli_args = cli::Cli::parse();
    let config = config::load_config();
    let data_dir = config.resolve_data_dir(cli_args.data_dir.as_deref());
    log::info!("Using data directory {:?}", data_dir);

    let ctx = cli::Context::new(kv::FileKv::new(data_dir), config);
    let mut prompt = cli::TerminalPrompt;

    if let Err(e) = cli::handle_cli_command(cli_args.command, &ctx, &mut prompt) {
        // Failures are reported once, as a message; the logs carry the detail.
        log::error!("Command failed: {:#?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    log::info!("NoteVault finished successfully.");
}
