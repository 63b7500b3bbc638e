use tracing_subscriber::EnvFilter;

mod backend;
mod code_actions;
mod config;
mod diagnostics;
mod server;
mod state;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() {
    // stdout carries the protocol; logs go to stderr.
    let filter = EnvFilter::try_from_env("VTOGGLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
    server::run().await;
}
