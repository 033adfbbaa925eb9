//! Entry point for the `ldap-test` binary
//!
//! Loads the YAML config, applies command-line overrides, then either runs a
//! maintenance command (listing or purging old test roots) or the test suite.

use clap::Parser;
use directory::{Connector, DirectoryHandle, LdapConnector};
use shared::{Component, component_debug, component_error, component_info, logging};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use ldap_tester::runtime::{list_test_data, purge_older_than, render_listing, render_purge};
use ldap_tester::{Args, Config, InterruptFlag, Runner, SUITE_NAME, TesterError, TesterResult, spawn_listener};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if args.version {
        println!("{SUITE_NAME} v{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let mut config = match Config::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {e}\n\nRun with --help for usage information");
        return ExitCode::FAILURE;
    }

    if let Err(e) = logging::init_tracing(config.effective_log_level(), Some(config.log_file.as_path())) {
        eprintln!("Failed to initialize logger: {e}");
        return ExitCode::FAILURE;
    }
    logging::log_startup(Component::Main, &format!("{SUITE_NAME} against {}", config.address()));

    let settings = match config.connection_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let connector: Arc<dyn Connector> = Arc::new(LdapConnector::new(settings));

    if config.list_test_data || config.cleanup_older_than.is_some() {
        return match run_maintenance(&config, connector).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("\nMaintenance failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let interrupt = InterruptFlag::new();
    let listener = config.loop_mode.then(|| spawn_listener(interrupt.clone()));

    let mut runner = Runner::new(config, connector);
    let result = runner.run(&interrupt).await;
    if let Some(listener) = listener {
        listener.abort();
    }

    match result {
        Ok(()) => ExitCode::from(runner.exit_code() as u8),
        Err(e) => {
            component_error!(Component::Main, "❌ Test suite failed: {e}");
            eprintln!("\nTest suite failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn connect_and_bind(config: &Config, connector: &dyn Connector) -> TesterResult<DirectoryHandle> {
    let directory = connector.connect().await.map_err(TesterError::Connection)?;
    let credentials = config.credentials();
    if let Err(e) = directory.bind(&credentials.bind_dn, &credentials.bind_password).await {
        close(&directory).await;
        return Err(TesterError::Connection(e));
    }
    Ok(directory)
}

async fn close(directory: &DirectoryHandle) {
    if let Err(e) = directory.unbind().await {
        component_debug!(Component::Maintenance, "Connection close reported: {e}");
    }
}

/// `--list-test-data` and `--cleanup-older-than`; purge runs after listing when both are given
async fn run_maintenance(config: &Config, connector: Arc<dyn Connector>) -> TesterResult<()> {
    let directory = connect_and_bind(config, connector.as_ref()).await?;
    let result = maintenance_commands(config, &directory).await;
    close(&directory).await;
    result
}

async fn maintenance_commands(config: &Config, directory: &DirectoryHandle) -> TesterResult<()> {
    if config.list_test_data {
        let listings = list_test_data(directory.as_ref(), &config.base_dn, &config.test_prefix).await?;
        print!("{}", render_listing(&listings));
    }

    let age: Option<Duration> = config.cleanup_age()?;
    if let Some(age) = age {
        component_info!(Component::Maintenance, "🧹 Purging test roots older than {}", humantime::format_duration(age));
        let report = purge_older_than(directory.as_ref(), &config.base_dn, &config.test_prefix, age).await?;
        print!("{}", render_purge(&report, age));
    }
    Ok(())
}
