use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use sshm::{
    App, AppSettings, HostRegistry, Orchestrator, Result, ensure_config_dir, init_panic_hook,
    init_tracing, resolve_config_dir,
};

#[derive(Debug, Parser)]
#[command(name = "sshm", version, about = "A terminal manager for SSH host profiles")]
struct Args {
    /// Directory for ssh_hosts.json, config.toml and sshm.log
    #[arg(long, value_name = "PATH")]
    config_dir: Option<PathBuf>,

    /// Log level or filter directive, used when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sshm: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config_dir = resolve_config_dir(args.config_dir.as_deref())?;
    ensure_config_dir(&config_dir)?;
    let settings = AppSettings::load(&config_dir)?;

    let log_level = args
        .log_level
        .unwrap_or_else(|| settings.log_level.clone());
    init_tracing(&config_dir, &log_level)?;
    init_panic_hook();
    tracing::info!("Starting sshm with config dir {}", config_dir.display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let registry = HostRegistry::open(&config_dir)?;
    tracing::info!(
        "Loaded {} hosts from {}",
        registry.len(),
        registry.hosts_file().display()
    );
    let orchestrator = Orchestrator::new(settings);

    let terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
    let mut app = App::new(terminal, registry, orchestrator, runtime.handle().clone());
    app.init_terminal()?;
    let result = app.run();

    // Sessions are bound to the runtime, so release them before it shuts down.
    runtime.block_on(app.orchestrator.disconnect());
    drop(app);

    if let Err(e) = &result {
        tracing::error!("Exiting with error: {}", e);
    } else {
        tracing::info!("Exiting");
    }
    result
}
