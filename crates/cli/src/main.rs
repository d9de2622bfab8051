mod commands;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{Shell, generate};
use cloudflare_speed_core::SpeedSetting;
use std::io;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cloudflare-speed")]
#[command(version, about = "Toggle Cloudflare zone speed settings", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print the raw API response as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file (defaults to ~/.cloudflare-speed/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Configure Cloudflare API credentials
    ///
    /// Required API Token Permissions:
    ///   Zone > Zone Settings > Edit
    ///
    /// Create token at: https://dash.cloudflare.com/profile/api-tokens
    Configure,

    /// Show the current state of a setting
    Get {
        /// speed_brain, fonts, early_hints or 0rtt
        setting: SpeedSetting,

        #[command(flatten)]
        zone: ZoneArg,
    },

    /// Turn a setting on or off
    Set {
        /// speed_brain, fonts, early_hints or 0rtt
        setting: SpeedSetting,

        #[arg(value_enum)]
        state: State,

        #[command(flatten)]
        zone: ZoneArg,
    },

    /// Turn a setting on
    Enable {
        setting: SpeedSetting,

        #[command(flatten)]
        zone: ZoneArg,
    },

    /// Turn a setting off
    Disable {
        setting: SpeedSetting,

        #[command(flatten)]
        zone: ZoneArg,
    },

    /// Show all speed settings for a zone
    Status {
        #[command(flatten)]
        zone: ZoneArg,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct ZoneArg {
    /// Zone identifier
    #[arg(short, long = "zone", env = "CLOUDFLARE_ZONE_ID")]
    zone_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum State {
    On,
    Off,
}

impl State {
    fn enabled(self) -> bool {
        self == State::On
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Token cancelled on Ctrl-C so in-flight requests are aborted
fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let opts = commands::Options {
        json: cli.json,
        config: cli.config,
    };

    match cli.command {
        Command::Configure => commands::configure::run(opts.config).await,
        Command::Get { setting, zone } => {
            let cancel = ctrl_c_token();
            commands::setting::get(&opts, setting, &zone.zone_id, &cancel).await
        }
        Command::Set {
            setting,
            state,
            zone,
        } => {
            let cancel = ctrl_c_token();
            commands::setting::set(&opts, setting, &zone.zone_id, state.enabled(), &cancel).await
        }
        Command::Enable { setting, zone } => {
            let cancel = ctrl_c_token();
            commands::setting::set(&opts, setting, &zone.zone_id, true, &cancel).await
        }
        Command::Disable { setting, zone } => {
            let cancel = ctrl_c_token();
            commands::setting::set(&opts, setting, &zone.zone_id, false, &cancel).await
        }
        Command::Status { zone } => {
            let cancel = ctrl_c_token();
            commands::setting::status(&opts, &zone.zone_id, &cancel).await
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "cloudflare-speed", &mut io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_set_command() {
        let cli = Cli::try_parse_from([
            "cloudflare-speed",
            "set",
            "speed-brain",
            "on",
            "--zone",
            "zone-123",
        ])
        .unwrap();

        match cli.command {
            Command::Set {
                setting,
                state,
                zone,
            } => {
                assert_eq!(setting, SpeedSetting::SpeedBrain);
                assert!(state.enabled());
                assert_eq!(zone.zone_id, "zone-123");
            }
            _ => panic!("expected set command"),
        }
    }

    #[test]
    fn test_parse_disable_zero_rtt() {
        let cli =
            Cli::try_parse_from(["cloudflare-speed", "disable", "0rtt", "-z", "abc", "--json"])
                .unwrap();

        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::Disable { setting: SpeedSetting::ZeroRtt, .. }
        ));
    }

    #[test]
    fn test_unknown_setting_is_rejected() {
        let result = Cli::try_parse_from(["cloudflare-speed", "get", "brotli", "--zone", "z"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_verbose_counts() {
        let cli = Cli::try_parse_from([
            "cloudflare-speed",
            "status",
            "--zone",
            "z",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
