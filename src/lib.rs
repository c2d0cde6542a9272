pub mod analysis;
pub mod chat;
mod cli;
pub mod interview;
pub mod models;
pub mod sensing;
pub mod settings;
pub mod store;
mod utils;

use clap::Parser;

pub use cli::Cli;

pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start async runtime: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(cli::execute(cli)) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
