//! Clap derive structures for the `poectl` CLI.

use std::path::PathBuf;

use clap::Parser;

/// poectl -- switch PoE on or off for ports of a UniFi switch
#[derive(Debug, Parser)]
#[command(
    name = "poectl",
    version,
    about = "Enable or disable PoE on UniFi switch ports",
    long_about = "Connects to a UniFi Network controller, finds the switch by MAC address,\n\
        and drives the selected ports to the requested PoE state.\n\n\
        Ports already in the requested state are left untouched.",
    after_help = "Examples:\n  \
        poectl 192.168.1.1 admin secret 00:11:22:33:44:55 1-4 --state off\n  \
        poectl unifi.lan admin secret 00:11:22:33:44:55 1,3,5-8 --state on --yes"
)]
pub struct Cli {
    /// Controller hostname or IP (an http:// or https:// prefix is kept)
    pub host: String,

    /// Controller login username
    pub username: String,

    /// Controller login password
    pub password: String,

    /// MAC address of the target switch
    pub switch_identifier: String,

    /// Ports to change, e.g. "1,3,5-8"
    pub port_spec: String,

    /// Desired PoE state: on, off, enable or disable
    #[arg(long, short = 's')]
    pub state: String,

    /// Controller HTTPS port
    #[arg(long, env = "POECTL_PORT", default_value_t = 443)]
    pub port: u16,

    /// Controller site name
    #[arg(long, env = "POECTL_SITE", default_value = "default")]
    pub site: String,

    /// Verify the controller's TLS certificate
    #[arg(long, env = "POECTL_VERIFY_SSL")]
    pub verify_ssl: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, env = "POECTL_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Path to a settings file (default: platform config dir)
    #[arg(long, env = "POECTL_CONFIG")]
    pub config: Option<PathBuf>,
}
