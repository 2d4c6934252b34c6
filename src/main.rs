use std::sync::Arc;

use clap::Parser;

use grader_runner::config::CliArgs;
use grader_runner::runner::SubmissionRunner;
use grader_runner::sandbox::DockerBackend;
use grader_runner::web_server::build_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = CliArgs::parse();
    let config = cli.to_config().expect("Failed to load configuration");

    let backend = DockerBackend::connect().expect("Failed to connect to the sandbox backend");
    let runner = Arc::new(SubmissionRunner::new(Arc::new(backend), config.runner));

    let server = build_server(config.server, runner).expect("Failed to build server");
    log::info!("Grader runner started");

    server.await?;

    log::info!("Shutdown complete");
    Ok(())
}
