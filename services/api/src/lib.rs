mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use bird_targets::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
