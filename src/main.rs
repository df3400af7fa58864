use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod dataset;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing the thread pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let dataset = match cfg.dataset.file.as_deref() {
        Some(path) => dataset::Dataset::load_from_file(path)?,
        None => dataset::Dataset::builtin(),
    };

    let listener = server::create_reusable_listener(addr, cfg.performance.backlog)?;
    let state = Arc::new(config::AppState::new(&cfg, dataset));
    let active_connections = Arc::new(AtomicUsize::new(0));

    logger::log_server_start(&addr, &state.config, state.dataset.city_count());

    let shutdown = server::shutdown::start_signal_handler();

    server::start_server_loop(listener, state, active_connections, shutdown).await
}
