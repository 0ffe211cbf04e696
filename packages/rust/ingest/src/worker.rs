//! The per-URL worker: hash, dedup check, fetch, transform, submit, record.

use linkdex_ledger::LedgerConn;
use linkdex_shared::{IngestDocument, Outcome, Result, content_hash, host_of};
use tracing::{info, warn};

use crate::extract::{extract_text, normalize};
use crate::fetch::Fetcher;
use crate::sink::IndexClient;

/// Everything one pool member needs to process URLs. Built once when the
/// member starts and reused for every URL it consumes.
pub struct WorkerContext {
    pub fetcher: Fetcher,
    pub sink: IndexClient,
    pub ledger: LedgerConn,
    /// Index name documents are written under.
    pub index_name: String,
}

/// Process one URL end-to-end, always yielding exactly one [`Outcome`].
///
/// Fetch, transform, and sink failures are caught here and become fail
/// outcomes; one bad URL never aborts the run. The only `Err` this returns
/// is a ledger read/write failure, which is configuration-class and fatal
/// to the whole run.
pub async fn process_url(ctx: &WorkerContext, url: &str) -> Result<Outcome> {
    let hash = content_hash(url);

    if ctx.ledger.exists(&hash).await? {
        info!(%url, "skipping, already ingested");
        return Ok(Outcome::skipped(url));
    }

    info!(%url, "processing");
    let response = match ctx.fetcher.fetch(url).await {
        Ok(response) => response,
        Err(e) => {
            warn!(%url, error = %e, "unable to process");
            return Ok(Outcome::fail(url, e.to_string()));
        }
    };

    if !response.status.is_success() {
        warn!(%url, status = response.status.as_u16(), "unable to process");
        return Ok(Outcome::fail(url, response.status.as_u16().to_string()));
    }

    info!(%url, "transforming");
    let content = normalize(&extract_text(&response.body));

    let doc = IngestDocument {
        url: url.to_string(),
        content,
        host: host_of(url),
    };

    info!(%url, "ingesting");
    if let Err(e) = ctx.sink.index(&ctx.index_name, &doc).await {
        warn!(%url, error = %e, "unable to process");
        return Ok(Outcome::fail(url, e.to_string()));
    }

    ctx.ledger.record(&hash).await?;
    info!(%url, "successfully processed");
    Ok(Outcome::success(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use linkdex_ledger::Ledger;
    use linkdex_shared::OutcomeStatus;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct TestEnv {
        pages: MockServer,
        sink: MockServer,
        ledger: Ledger,
        db_dir: std::path::PathBuf,
    }

    impl TestEnv {
        async fn new() -> Self {
            let pages = MockServer::start().await;
            let sink = MockServer::start().await;
            let db_dir = std::env::temp_dir().join(format!("linkdex-worker-{}", Uuid::now_v7()));
            let ledger = Ledger::open(&db_dir.join("ledger.db")).await.unwrap();
            Self {
                pages,
                sink,
                ledger,
                db_dir,
            }
        }

        fn context(&self) -> WorkerContext {
            let sink_uri = url::Url::parse(&self.sink.uri()).unwrap();
            WorkerContext {
                fetcher: Fetcher::new("test-agent", Duration::from_secs(2)).unwrap(),
                sink: IndexClient::new(sink_uri.host_str().unwrap(), sink_uri.port().unwrap())
                    .unwrap(),
                ledger: self.ledger.connect().unwrap(),
                index_name: "bookmarks".into(),
            }
        }
    }

    impl Drop for TestEnv {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.db_dir);
        }
    }

    #[tokio::test]
    async fn successful_url_is_ingested_and_recorded() {
        let env = TestEnv::new().await;
        let page_url = format!("{}/article", env.pages.uri());

        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>Hello, indexed world!</p></body></html>"),
            )
            .mount(&env.pages)
            .await;

        let page_host = url::Url::parse(&page_url).unwrap().host_str().unwrap().to_string();
        Mock::given(method("POST"))
            .and(path("/bookmarks/_doc"))
            .and(body_json(serde_json::json!({
                "url": page_url,
                "content": "Hello indexed world",
                "host": page_host,
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&env.sink)
            .await;

        let ctx = env.context();
        let outcome = process_url(&ctx, &page_url).await.unwrap();
        assert_eq!(outcome.status, OutcomeStatus::Success);

        // The hash is now in the ledger.
        assert!(ctx.ledger.exists(&content_hash(&page_url)).await.unwrap());
    }

    #[tokio::test]
    async fn dead_url_fails_with_status_code_reason() {
        let env = TestEnv::new().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&env.pages)
            .await;

        let page_url = format!("{}/gone", env.pages.uri());
        let outcome = process_url(&env.context(), &page_url).await.unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Fail);
        assert_eq!(outcome.reason.as_deref(), Some("404"));

        // Failures are not recorded.
        let conn = env.ledger.connect().unwrap();
        assert!(!conn.exists(&content_hash(&page_url)).await.unwrap());
    }

    #[tokio::test]
    async fn known_url_is_skipped_without_any_network_call() {
        let env = TestEnv::new().await;
        // Any request to either server fails the test.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&env.pages)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&env.sink)
            .await;

        let page_url = format!("{}/seen", env.pages.uri());
        let ctx = env.context();
        ctx.ledger.record(&content_hash(&page_url)).await.unwrap();

        let outcome = process_url(&ctx, &page_url).await.unwrap();
        assert_eq!(outcome.status, OutcomeStatus::Skipped);
        assert!(outcome.reason.is_none());
    }

    #[tokio::test]
    async fn timeout_becomes_fail_outcome_with_timeout_reason() {
        let env = TestEnv::new().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
            .mount(&env.pages)
            .await;

        let page_url = format!("{}/slow", env.pages.uri());
        let outcome = process_url(&env.context(), &page_url).await.unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Fail);
        assert!(
            outcome.reason.as_deref().unwrap_or_default().contains("timed out"),
            "reason: {:?}",
            outcome.reason
        );
    }

    #[tokio::test]
    async fn sink_rejection_becomes_fail_outcome() {
        let env = TestEnv::new().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>fine page</p>"))
            .mount(&env.pages)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&env.sink)
            .await;

        let page_url = format!("{}/page", env.pages.uri());
        let ctx = env.context();
        let outcome = process_url(&ctx, &page_url).await.unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Fail);
        assert!(outcome.reason.as_deref().unwrap_or_default().contains("503"));

        // Sink failure means no ledger record: the URL retries next run.
        assert!(!ctx.ledger.exists(&content_hash(&page_url)).await.unwrap());
    }

    #[tokio::test]
    async fn disabled_dedup_reprocesses_known_urls() {
        let pages = MockServer::start().await;
        let sink = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>again</p>"))
            .expect(2)
            .mount(&pages)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(2)
            .mount(&sink)
            .await;

        let sink_uri = url::Url::parse(&sink.uri()).unwrap();
        let ctx = WorkerContext {
            fetcher: Fetcher::new("test-agent", Duration::from_secs(2)).unwrap(),
            sink: IndexClient::new(sink_uri.host_str().unwrap(), sink_uri.port().unwrap()).unwrap(),
            ledger: Ledger::disabled().connect().unwrap(),
            index_name: "bookmarks".into(),
        };

        let page_url = format!("{}/page", pages.uri());
        for _ in 0..2 {
            let outcome = process_url(&ctx, &page_url).await.unwrap();
            assert_eq!(outcome.status, OutcomeStatus::Success);
        }
    }
}
