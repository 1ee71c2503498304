use std::thread;
use timer_log::{global_destroy, global_init_with, global_timer_mark, with_global, TimerLogConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const WORKERS: i64 = 4;
const REQUESTS_PER_WORKER: i64 = 8;

/// Traces a few fake request lifecycles through the global timer log.
///
/// Capacity and template come from `TIMER_LOG_CAPACITY` / `TIMER_LOG_FORMAT`,
/// diagnostics go to stderr filtered by `RUST_LOG` and timer records to stdout.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match TimerLogConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid timer log configuration");
            std::process::exit(2);
        }
    };
    info!(capacity = config.capacity_limit, "starting timer log demo");
    global_init_with(config, Box::new(std::io::BufWriter::new(std::io::stdout())));

    thread::scope(|scope| {
        for worker in 0..WORKERS {
            scope.spawn(move || {
                for request in 0..REQUESTS_PER_WORKER {
                    let seq = worker * REQUESTS_PER_WORKER + request;
                    global_timer_mark!("request_received", seq);
                    global_timer_mark!("request_parsed", seq);
                    global_timer_mark!("request_completed", seq);
                }
            });
        }
    });

    if let Some((stats, buffered)) = with_global(|log| (log.stats(), log.len())) {
        info!(flushes_on_full = stats.flushes_on_full, buffered, "workers done");
    }
    global_destroy();
}
