//! Run report: the canonical record of one ingestion run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use linkdex_shared::{LinkdexError, Outcome, OutcomeStatus, Result};

/// All outcomes of one run, in dispatch order, plus run metadata.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Time-sortable identifier for this run (appears in logs only).
    pub run_id: String,
    /// When the run started; also names the report file.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// One outcome per dispatched URL, in dispatch order.
    pub outcomes: Vec<Outcome>,
    /// Path of the written CSV artifact, once the pipeline has written it.
    pub artifact: Option<PathBuf>,
}

impl RunReport {
    /// Number of outcomes with the given status.
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Write the report as a CSV table into `dir` and return the file path.
    ///
    /// The file is named `result_YYYY_MM_DD_HH_MM_SS.csv` after the run's
    /// start time; concurrent runs within the same second collide (known
    /// limitation). Header row `URL,STATUS,REASON`, then one row per URL.
    pub fn write_csv(&self, dir: &Path) -> Result<PathBuf> {
        let filename = format!("result_{}.csv", self.started_at.format("%Y_%m_%d_%H_%M_%S"));
        let path = dir.join(filename);

        let mut table = String::from("URL,STATUS,REASON\n");
        for outcome in &self.outcomes {
            table.push_str(&csv_field(&outcome.url));
            table.push(',');
            table.push_str(outcome.status.as_str());
            table.push(',');
            table.push_str(&csv_field(outcome.reason.as_deref().unwrap_or_default()));
            table.push('\n');
        }

        std::fs::write(&path, table).map_err(|e| LinkdexError::io(&path, e))?;
        Ok(path)
    }
}

/// Quote a CSV field when it carries a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn report(outcomes: Vec<Outcome>) -> RunReport {
        RunReport {
            run_id: Uuid::now_v7().to_string(),
            started_at: Utc::now(),
            elapsed: Duration::from_millis(1),
            outcomes,
            artifact: None,
        }
    }

    #[test]
    fn csv_has_header_plus_one_row_per_url() {
        let dir = std::env::temp_dir().join(format!("linkdex-report-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();

        let report = report(vec![
            Outcome::success("http://a.test"),
            Outcome::fail("http://b.test", "404"),
            Outcome::skipped("http://c.test"),
        ]);
        let path = report.write_csv(&dir).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "URL,STATUS,REASON");
        assert_eq!(lines[1], "http://a.test,success,");
        assert_eq!(lines[2], "http://b.test,fail,404");
        assert_eq!(lines[3], "http://c.test,skipped,");

        // Every row carries a non-empty STATUS column.
        for line in &lines[1..] {
            assert!(!line.split(',').nth(1).unwrap().is_empty());
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn csv_escapes_reasons_with_delimiters() {
        let dir = std::env::temp_dir().join(format!("linkdex-report-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();

        let report = report(vec![Outcome::fail(
            "http://a.test",
            r#"network error: dns failure, try again "later""#,
        )]);
        let path = report.write_csv(&dir).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#""network error: dns failure, try again ""later""""#));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn csv_filename_is_timestamped() {
        let dir = std::env::temp_dir().join(format!("linkdex-report-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = report(vec![]).write_csv(&dir).unwrap();
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("result_"));
        assert!(name.ends_with(".csv"));
        // result_ + YYYY_MM_DD_HH_MM_SS + .csv
        assert_eq!(name.len(), "result_".len() + 19 + ".csv".len());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn status_counts() {
        let report = report(vec![
            Outcome::success("http://a.test"),
            Outcome::success("http://b.test"),
            Outcome::fail("http://c.test", "500"),
        ]);
        assert_eq!(report.count(OutcomeStatus::Success), 2);
        assert_eq!(report.count(OutcomeStatus::Fail), 1);
        assert_eq!(report.count(OutcomeStatus::Skipped), 0);
    }
}
