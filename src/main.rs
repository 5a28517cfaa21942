use clap::Parser;
use colored::Colorize;

use ipgeo::cli::{Cli, Commands};
use ipgeo::config::{StaticConfig, validate_config};
use ipgeo::runtime::modes;
use ipgeo::system::logging::init_logging;

const DEFAULT_SAMPLE_CONFIG_PATH: &str = "config.example.toml";

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Some(Commands::GenerateConfig { output_path }) = &cli.command {
        let path = output_path.as_deref().unwrap_or(DEFAULT_SAMPLE_CONFIG_PATH);
        if let Err(e) = StaticConfig::default().save_to_file(path) {
            eprintln!("{} Failed to write {}: {}", "[ERROR]".red().bold(), path, e);
            std::process::exit(1);
        }
        println!("{} Sample configuration written to {}", "[OK]".green().bold(), path);
        return Ok(());
    }

    let config = StaticConfig::load(cli.config.as_deref());
    if let Err(e) = validate_config(&config) {
        eprintln!("{} Invalid configuration: {}", "[ERROR]".red().bold(), e);
        std::process::exit(1);
    }

    // 必须持有 guard 直到进程退出，否则日志不会刷新
    let guard = init_logging(&config.logging)?;

    match cli.command {
        Some(Commands::Lookup { ip }) => {
            if !modes::run_lookup(&config, &ip).await? {
                drop(guard);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve) | None => modes::run_server(&config).await?,
        Some(Commands::GenerateConfig { .. }) => {}
    }

    Ok(())
}
