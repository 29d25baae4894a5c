use common::utils::logging::init_logging_from_env;
use dotenvy::dotenv;
use tracing::{error, info};

fn init_logging() {
    // load .env first so RUST_LOG and LOG_FORMAT apply
    dotenv().ok();
    init_logging_from_env();
    info!(service = "movie-catalog", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "movie-catalog", event = "panic", pid, message = %info, "unhandled panic occurred");
    }));

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "movie-catalog", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(service = "movie-catalog", event = "start", pid, version, "movie catalog starting");

    // server::run handles Ctrl+C itself through graceful shutdown
    match rt.block_on(server::run()) {
        Ok(()) => {
            info!(service = "movie-catalog", event = "stop", pid, "server stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "movie-catalog", event = "run_failed", error = %e, "server::run returned error");
            std::process::ExitCode::FAILURE
        }
    }
}
