//! `jive` binary entry point: parses CLI arguments and dispatches to
//! `jive_server::cli::run`.

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match jive_server::cli::run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("jive: {error}");
            std::process::ExitCode::FAILURE
        }
    }
}
