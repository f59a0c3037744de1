mod cli;
mod config;
mod error;
mod output;

use clap::Parser;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use poectl_core::{
    ControllerConfig, DesiredState, LegacyGateway, MacAddress, Orchestrator, RunRequest,
    TlsVerification, TracingObserver, controller_url, parse_port_spec,
};

use crate::cli::Cli;
use crate::error::{CliError, exit_code};
use crate::output::PromptConfirmer;

#[tokio::main]
async fn main() {
    // Usage errors exit 1 like every other failure; help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(if err.use_stderr() {
                exit_code::FAILURE
            } else {
                exit_code::SUCCESS
            });
        }
    };

    init_tracing(cli.debug);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let code = match run(cli, &cancel).await {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Cancelled) => exit_code::FAILURE,
        Err(err) if !err.is_reportable() => {
            tracing::warn!("{err}");
            exit_code::FAILURE
        }
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            exit_code::FAILURE
        }
    };
    std::process::exit(code);
}

fn init_tracing(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// First Ctrl-C cancels the run; the orchestrator still releases the session.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, aborting...");
            cancel.cancel();
        }
    });
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<(), CliError> {
    // Validate local input before touching the network.
    let desired = DesiredState::parse_token(&cli.state)?;
    let ports = parse_port_spec(&cli.port_spec)?;
    let settings = config::load_settings(cli.config.as_deref())?;
    let url = controller_url(&cli.host, cli.port)?;

    let request = RunRequest {
        switch_mac: MacAddress::new(&cli.switch_identifier),
        ports,
        desired,
    };

    let controller = ControllerConfig {
        url,
        username: cli.username,
        password: SecretString::from(cli.password),
        site: cli.site,
        tls: if cli.verify_ssl {
            TlsVerification::SystemDefaults
        } else {
            TlsVerification::DangerAcceptInvalid
        },
        timeout: settings.timeout(cli.timeout),
    };

    let confirmer = PromptConfirmer {
        yes: cli.yes,
        color: output::should_color(),
    };

    let orchestrator = Orchestrator::new(LegacyGateway::new(controller), confirmer, TracingObserver)
        .with_verify_policy(settings.verify_policy());

    let report = orchestrator.run(&request, cancel).await?;
    tracing::debug!(
        state = %report.state,
        device = %report.device,
        changed = report.actions.len(),
        mismatches = report.has_mismatches(),
        "run finished"
    );
    Ok(())
}
