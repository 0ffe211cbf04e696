//! End-to-end ingestion pipeline: export → URL list → worker pool → report.
//!
//! Fan-out is an explicit bounded task queue consumed by a fixed pool of
//! workers. Each pool member builds its own fetcher, sink client, and ledger
//! connection once, then loops. Completion order is arbitrary; outcomes are
//! matched back to their dispatch positions before the report is assembled.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, mpsc};
use tracing::{info, instrument};
use uuid::Uuid;

use linkdex_ingest::{Fetcher, IndexClient, WorkerContext, process_url};
use linkdex_ledger::Ledger;
use linkdex_shared::{LinkdexError, Outcome, OutcomeStatus, Result, RunConfig};

use crate::report::RunReport;

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a URL finishes, in completion order.
    fn url_done(&self, outcome: &Outcome, completed: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn url_done(&self, _outcome: &Outcome, _completed: usize, _total: usize) {}
    fn done(&self, _report: &RunReport) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full ingestion pipeline.
///
/// 1. Parse the bookmark export
/// 2. Flatten the tree into the URL list
/// 3. Open the dedup ledger (or a disabled one)
/// 4. Fan the worker out over the URL list
/// 5. Assemble the run report
///
/// Only parse and ledger failures are fatal here; per-URL failures live
/// inside their outcomes.
#[instrument(skip_all, fields(location = %config.location.display()))]
pub async fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunReport> {
    let start = Instant::now();
    let started_at = chrono::Utc::now();
    let run_id = Uuid::now_v7().to_string();

    info!(%run_id, pool_size = config.pool_size, "starting ingestion run");

    progress.phase("Parsing bookmark export");
    let tree = linkdex_bookmarks::parse_file(&config.location)?;
    let urls = linkdex_bookmarks::flatten(&tree);
    info!(urls = urls.len(), "bookmark tree flattened");

    progress.phase("Opening dedup ledger");
    let ledger = if config.dedup_enabled {
        let path = config.database.as_ref().ok_or_else(|| {
            LinkdexError::config("ledger path is required when dedup is enabled")
        })?;
        Ledger::open(path).await?
    } else {
        info!("dedup disabled, every URL will be processed");
        Ledger::disabled()
    };

    progress.phase("Processing bookmarks");
    let outcomes = dispatch(config, &ledger, &urls, progress).await?;

    let mut report = RunReport {
        run_id: run_id.clone(),
        started_at,
        elapsed: start.elapsed(),
        outcomes,
        artifact: None,
    };

    progress.phase("Writing run report");
    let artifact = report.write_csv(&config.output_dir)?;
    report.artifact = Some(artifact);

    info!(
        %run_id,
        success = report.count(OutcomeStatus::Success),
        fail = report.count(OutcomeStatus::Fail),
        skipped = report.count(OutcomeStatus::Skipped),
        elapsed_ms = report.elapsed.as_millis(),
        "ingestion run complete"
    );

    progress.done(&report);
    Ok(report)
}

/// Fan the worker out over `urls` with a bounded task queue and a fixed pool
/// of consumers. Returns outcomes in dispatch order.
async fn dispatch(
    config: &RunConfig,
    ledger: &Ledger,
    urls: &[String],
    progress: &dyn ProgressReporter,
) -> Result<Vec<Outcome>> {
    let total = urls.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let pool_size = config.pool_size.max(1);
    let (task_tx, task_rx) = mpsc::channel::<(usize, String)>(pool_size * 2);
    let task_rx = Arc::new(Mutex::new(task_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<(usize, Outcome)>(total);

    let mut workers = Vec::with_capacity(pool_size);
    for _ in 0..pool_size {
        // Per-member clients, built once and reused across that member's URLs.
        let fetcher = Fetcher::new(
            &config.user_agent,
            Duration::from_secs(config.fetch_timeout_secs),
        )?;
        let sink = IndexClient::new(&config.index_host, config.index_port)?;
        let ctx = WorkerContext {
            fetcher,
            sink,
            ledger: ledger.connect()?,
            index_name: config.index_name.clone(),
        };

        let task_rx = task_rx.clone();
        let result_tx = result_tx.clone();
        workers.push(tokio::spawn(async move {
            loop {
                let task = { task_rx.lock().await.recv().await };
                let Some((idx, url)) = task else {
                    break;
                };
                let outcome = process_url(&ctx, &url).await?;
                if result_tx.send((idx, outcome)).await.is_err() {
                    break;
                }
            }
            Ok::<(), LinkdexError>(())
        }));
    }
    drop(result_tx);

    // Feed the queue concurrently; workers drain it as it fills. If every
    // worker has already exited, send fails and the feeder stops.
    let tasks: Vec<(usize, String)> = urls.iter().cloned().enumerate().collect();
    let feeder = tokio::spawn(async move {
        for task in tasks {
            if task_tx.send(task).await.is_err() {
                break;
            }
        }
    });

    let mut ordered: Vec<Option<Outcome>> = vec![None; total];
    let mut completed = 0usize;
    while let Some((idx, outcome)) = result_rx.recv().await {
        completed += 1;
        progress.url_done(&outcome, completed, total);
        ordered[idx] = Some(outcome);
    }

    let _ = feeder.await;

    for worker in workers {
        match worker.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(e) => {
                return Err(LinkdexError::config(format!("worker task failed: {e}")));
            }
        }
    }

    // Every worker finished cleanly, so every slot was filled.
    Ok(ordered
        .into_iter()
        .map(|slot| slot.expect("each dispatched URL yields exactly one outcome"))
        .collect())
}
