use kitdm::{
    cli::execute_command,
    commands::{create_cli_commands, PARAMETER_DEBUG},
    error_utils,
};
use tracing_subscriber::EnvFilter;

/// Main entry point for the program
#[tokio::main]
async fn main() {
    let matches = create_cli_commands();

    // Intialize the logging subsystem, diagnostics never mix with results on stdout
    let mut filter = EnvFilter::from_default_env();
    if matches.get_flag(PARAMETER_DEBUG) {
        if let Ok(directive) = "kitdm=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute_command(&matches).await {
        error_utils::report_error(&e);
        if let Some(hint) = error_utils::hint_for(&e) {
            eprintln!("HINT: {}", hint);
        }
        let code = e.exit_code();
        tracing::debug!("Exiting with {} ({})", code.code(), code.message());
        ::std::process::exit(code.code());
    }
}
