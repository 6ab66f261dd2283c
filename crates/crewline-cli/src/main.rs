use anyhow::Context;
use chrono::Utc;
use crewline_cli::{exit_codes, AppConfig, HttpRecordSource, JsonFileStore, NtfySink};
use crewline_core::PollCycle;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::CONFIG_ERROR
        }
    };
    std::process::exit(code);
}

async fn run() -> anyhow::Result<i32> {
    let (path, required) = AppConfig::resolve_path();
    let config = AppConfig::load(&path, required)
        .with_context(|| format!("loading {}", path.display()))?;
    let cycle = PollCycle::new(&config.watch).context("invalid watch configuration")?;

    let cookie = std::env::var(&config.source.cookie_env)
        .ok()
        .filter(|value| !value.trim().is_empty());
    if cookie.is_none() {
        tracing::warn!(
            env = %config.source.cookie_env,
            "no session cookie set; the feed will likely reject the request"
        );
    }

    let source = HttpRecordSource::new(config.source.clone(), &config.watch.timezone, cookie)
        .context("building schedule source")?;
    let sink = NtfySink::new(&config.notify).context("building notification sink")?;
    let store = JsonFileStore::new(&config.snapshot.path);
    tracing::debug!(
        snapshot = %store.path().display(),
        endpoint = %sink.endpoint(),
        "adapters ready"
    );

    match cycle.run(&source, &store, &sink, Utc::now()).await {
        Ok(report) => {
            tracing::info!(
                baseline = report.baseline,
                upcoming = report.upcoming,
                sent = report.sent(),
                failed = report.failed(),
                "poll finished"
            );
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            tracing::error!(error = %e, "poll failed");
            Ok(e.exit_code())
        }
    }
}
