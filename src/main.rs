use jotter::{Config, run};

fn main() -> anyhow::Result<()> {
    // Runtime sizing comes from config, so load it before tokio starts.
    let worker_threads = Config::load()?.general.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }

    builder.build()?.block_on(run())
}
