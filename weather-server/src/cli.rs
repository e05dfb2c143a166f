use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{Password, Text};
use weather_core::Config;

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Condensed weather and alerts over HTTP")]
pub struct Cli {
    /// Defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server.
    Serve(ServeArgs),

    /// Store the OpenWeather API key (and optionally a different base URL).
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Port to listen on; overrides config and WEATHER_PORT.
    #[arg(long)]
    pub port: Option<u16>,

    /// Address to bind; overrides config and WEATHER_BIND_ADDRESS.
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeArgs {
    fn apply(self, config: &mut Config) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Serve(ServeArgs::default())) {
            Command::Serve(args) => {
                let mut config = Config::load()?;
                args.apply(&mut config);
                server::start_server(&config).await
            }
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_stored()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let base_url = Text::new("OpenWeather base URL:")
        .with_default(&config.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    config.api_key = Some(api_key.trim().to_string());
    config.base_url = base_url.trim().to_string();
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
