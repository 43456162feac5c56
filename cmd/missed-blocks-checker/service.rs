use mbc_engine::{ClassificationEngine, Report, SnapshotSource};
use mbc_reporters::{LatestSnapshot, Reporter};
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, warn};

/// Sends `report` to every reporter. Returns how many deliveries succeeded.
///
/// A failing reporter is logged and skipped; the others still get the report.
pub async fn deliver_report(reporters: &[Box<dyn Reporter>], report: &Report) -> usize {
    if report.is_empty() {
        debug!("report is empty, not sending");
        return 0;
    }

    let mut sent_count = 0;
    for reporter in reporters {
        match reporter.send_report(report).await {
            Ok(()) => {
                sent_count += 1;
                info!(reporter = reporter.name(), entries = report.len(), "report sent");
            }
            Err(error) => {
                warn!(reporter = reporter.name(), error = %error, "failed to send report");
            }
        }
    }

    sent_count
}

/// One poll: fetch, classify, publish the retained snapshot, deliver.
pub async fn run_cycle<S>(
    engine: &mut ClassificationEngine,
    source: &S,
    reporters: &[Box<dyn Reporter>],
    latest: &LatestSnapshot,
) -> Report
where
    S: SnapshotSource + ?Sized,
{
    let report = engine.tick(source).await;
    if let Some(previous) = engine.previous() {
        latest.update(previous.clone());
    }
    deliver_report(reporters, &report).await;
    report
}

/// Polls every `interval` until ctrl-c.
pub async fn run<S>(
    engine: ClassificationEngine,
    source: &S,
    reporters: &[Box<dyn Reporter>],
    latest: &LatestSnapshot,
    interval: Duration,
) where
    S: SnapshotSource + ?Sized,
{
    let shutdown = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(error = %error, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        info!("received ctrl-c, shutting down");
    };

    run_until(engine, source, reporters, latest, interval, shutdown).await;
}

/// Polls every `interval` until `shutdown` resolves.
///
/// `shutdown` is polled for the whole run, so a signal that arrives while a
/// cycle is in flight stops the loop once that cycle has been delivered.
pub async fn run_until<S, F>(
    mut engine: ClassificationEngine,
    source: &S,
    reporters: &[Box<dyn Reporter>],
    latest: &LatestSnapshot,
    interval: Duration,
    shutdown: F,
) where
    S: SnapshotSource + ?Sized,
    F: Future<Output = ()>,
{
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(interval_seconds = interval.as_secs(), "missed blocks checker started");

    loop {
        tokio::select! {
            _ = &mut shutdown => return,
            _ = ticker.tick() => {
                run_cycle(&mut engine, source, reporters, latest).await;
            }
        }
    }
}
