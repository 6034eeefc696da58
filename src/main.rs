use rust_webtools::{create_dir_if_not_exist, logger, ToolkitConfig};
use std::sync::Arc;

mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => ToolkitConfig::load_from(&path)?,
        None => ToolkitConfig::load()?,
    };
    logger::init(&cfg.logging)?;

    // Worker threads default to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: ToolkitConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    create_dir_if_not_exist(&cfg.upload.directory).await?;

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg.upload.directory);
    logger::log_info(&format!(
        "[CONFIG] Upload limit {} bytes, JSON body limit {} bytes",
        cfg.upload.file_size_limit(),
        cfg.json.body_limit()
    ));

    server::run_server(listener, Arc::new(server::AppState::new(cfg))).await
}
