//! Integration tests for the bulk fetch pipeline against an in-memory source

use super::support::{item, MockSource};
use card_pricer::cancel::CancellationToken;
use card_pricer::fetcher::FetcherError;
use card_pricer::output::ExportFormat;
use card_pricer::pipeline::{
    progress_channel, BulkFetchExecutor, FetchJob, FetchOutcome, JobStatus, PipelineError,
    ProgressEvent, ProgressReporter,
};
use card_pricer::{CodeResolver, Rarity};
use serial_test::serial;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

fn executor(source: Arc<MockSource>) -> BulkFetchExecutor {
    BulkFetchExecutor::new(source)
        .with_resolver(CodeResolver::identity())
        .with_set_delay(Duration::ZERO)
}

/// Two-item set plus a failing set
fn scenario_source() -> MockSource {
    MockSource::new()
        .with_set(
            "AAA",
            vec![
                item("AAA", "1", "Alpha", Rarity::Common, Some("3.10"), None),
                item("AAA", "2", "Beta", Rarity::Rare, Some("0.80"), Some("1.20")),
            ],
        )
        .with_failure(
            "BBB",
            FetcherError::RemoteUnavailable("timeout".to_string()),
        )
}

fn drain(rx: &mut UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn log_lines(events: &[ProgressEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Log(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
#[serial]
async fn test_end_to_end_with_partial_failure() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("data");
    let executor = executor(Arc::new(scenario_source()));

    let job = FetchJob::new(
        vec!["AAA".to_string(), "BBB".to_string()],
        ExportFormat::ItemWizard,
        &out,
    )
    .with_combined(10);

    let (reporter, mut rx) = progress_channel();
    let report = executor
        .execute(job, &CancellationToken::new(), reporter)
        .await
        .unwrap();

    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(
        report.outcomes,
        vec![
            FetchOutcome::Success {
                set_code: "AAA".to_string(),
                items: 2
            },
            FetchOutcome::Failure {
                set_code: "BBB".to_string(),
                error: "timeout".to_string()
            },
        ]
    );
    assert_eq!(report.total_entries, 3);
    assert_eq!(
        report.summary_line(),
        "Successful: 1 | Failed: 1 | Total: 2 | Total card entries: 3"
    );

    assert_eq!(report.combined_files, vec![out.join("00_combined_list.csv")]);
    let combined = fs::read_to_string(out.join("00_combined_list.csv")).unwrap();
    assert_eq!(
        combined,
        "AAA 1,Alpha,,0,0.0,0,0,0,3.00\n\
         AAA 2,Beta,,0,0.0,0,0,0,1.00\n\
         AAA 2f,Beta,,0,0.0,0,0,0,1.00\n"
    );

    // Per-set file for the success only
    assert_eq!(
        fs::read_to_string(out.join("AAA_prices.csv")).unwrap(),
        combined
    );
    assert!(!out.join("BBB_prices.csv").exists());

    let events = drain(&mut rx);
    let lines = log_lines(&events);
    assert_eq!(lines[0], "=== Bulk Fetch Started ===");
    assert!(lines.contains(&"Combined files: enabled (split every 10 entries)".to_string()));
    assert!(lines.contains(&"[1/2] Processing AAA...".to_string()));
    assert!(lines.contains(&"✓ AAA - Success (2 cards)".to_string()));
    assert!(lines.contains(&"✗ BBB - Failed: timeout".to_string()));
    assert!(lines.iter().any(|l| l.starts_with(">>> Created combined file:")
        && l.ends_with("(3 entries)")));
    assert!(lines.contains(&"Combined files complete: 1 file(s) created".to_string()));
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Finished(JobStatus::Completed))
    );

    let progress: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress { completed, requested } => Some((*completed, *requested)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(1, 2), (2, 2)]);
}

#[tokio::test]
#[serial]
async fn test_failure_does_not_stop_later_sets() {
    let temp = tempfile::tempdir().unwrap();
    let source = Arc::new(
        MockSource::new()
            .with_set(
                "CCC",
                vec![item("CCC", "9", "Gamma", Rarity::Uncommon, Some("0.01"), None)],
            )
            .with_set("DDD", vec![]),
    );
    let executor = executor(source.clone());

    let job = FetchJob::new(
        vec!["ZZZ".to_string(), "CCC".to_string(), "DDD".to_string()],
        ExportFormat::ImportUtility,
        temp.path(),
    );
    let report = executor
        .execute(job, &CancellationToken::new(), ProgressReporter::disabled())
        .await
        .unwrap();

    assert_eq!(source.calls(), vec!["ZZZ", "CCC", "DDD"]);
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(
        report.outcomes[0],
        FetchOutcome::Failure {
            set_code: "ZZZ".to_string(),
            error: "Card or set not found".to_string()
        }
    );
    assert!(report.outcomes[1].is_success());
    assert!(report.outcomes[2].is_success());
    assert!(report.combined_files.is_empty());

    let ccc = fs::read_to_string(temp.path().join("CCC_prices.csv")).unwrap();
    assert!(ccc.ends_with("5,5.2,CCC 9,Gamma,,U,TAX,0.50\n"), "{ccc}");

    // Empty set still gets a header-only file
    let ddd = fs::read_to_string(temp.path().join("DDD_prices.csv")).unwrap();
    assert_eq!(ddd.lines().count(), 1);
}

#[tokio::test]
#[serial]
async fn test_display_codes_are_resolved_for_fetch_only() {
    let temp = tempfile::tempdir().unwrap();
    let source = Arc::new(MockSource::new().with_set(
        "10E",
        vec![item("10E", "1", "Angel", Rarity::Uncommon, Some("2.60"), None)],
    ));
    let executor = BulkFetchExecutor::new(source.clone())
        .with_resolver(CodeResolver::from_pairs(&[("XED", "10E")]).unwrap())
        .with_set_delay(Duration::ZERO);

    let job = FetchJob::new(vec!["xed".to_string()], ExportFormat::ItemWizard, temp.path());
    let report = executor
        .execute(job, &CancellationToken::new(), ProgressReporter::disabled())
        .await
        .unwrap();

    assert_eq!(source.calls(), vec!["10E"]);
    assert_eq!(report.outcomes[0].set_code(), "XED");
    assert_eq!(report.entries[0].code, "XED 1");
    assert_eq!(
        fs::read_to_string(temp.path().join("XED_prices.csv")).unwrap(),
        "XED 1,Angel,,0,0.0,0,0,0,2.50\n"
    );
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_n_sets_incur_n_minus_one_delays() {
    let temp = tempfile::tempdir().unwrap();
    let source = Arc::new(
        MockSource::new()
            .with_set("AAA", vec![])
            .with_set("BBB", vec![])
            .with_set("CCC", vec![]),
    );
    let delay = Duration::from_millis(100);
    let executor = BulkFetchExecutor::new(source)
        .with_resolver(CodeResolver::identity())
        .with_set_delay(delay);

    let job = FetchJob::new(
        vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()],
        ExportFormat::ItemWizard,
        temp.path(),
    );

    let started = Instant::now();
    let report = executor
        .execute(job, &CancellationToken::new(), ProgressReporter::disabled())
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(started.elapsed(), delay * 2);
}

#[tokio::test]
#[serial]
async fn test_second_run_is_rejected_while_first_runs() {
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    let source = Arc::new(
        MockSource::new()
            .with_set("AAA", vec![])
            .with_latency(Duration::from_millis(50)),
    );
    let executor = executor(source);
    let cancel = CancellationToken::new();

    let first = FetchJob::new(vec!["AAA".to_string()], ExportFormat::ItemWizard, first_dir.path());
    let second = FetchJob::new(vec!["AAA".to_string()], ExportFormat::ItemWizard, second_dir.path());

    let (a, b) = tokio::join!(
        executor.execute(first, &cancel, ProgressReporter::disabled()),
        executor.execute(second, &cancel, ProgressReporter::disabled()),
    );

    assert_eq!(a.unwrap().status, JobStatus::Completed);
    assert!(matches!(b, Err(PipelineError::AlreadyRunning)));

    // Gate released after the first run
    let third = FetchJob::new(vec!["AAA".to_string()], ExportFormat::ItemWizard, second_dir.path());
    assert!(executor
        .execute(third, &cancel, ProgressReporter::disabled())
        .await
        .is_ok());
}

#[tokio::test]
#[serial]
async fn test_per_set_write_failure_is_recorded() {
    let temp = tempfile::tempdir().unwrap();
    // A directory where the per-set file should go
    fs::create_dir_all(temp.path().join("BBB_prices.csv")).unwrap();

    let source = Arc::new(
        MockSource::new()
            .with_set(
                "AAA",
                vec![item("AAA", "1", "Alpha", Rarity::Common, Some("1.00"), None)],
            )
            .with_set(
                "BBB",
                vec![item("BBB", "1", "Bravo", Rarity::Common, Some("1.00"), None)],
            ),
    );
    let executor = executor(source);

    let job = FetchJob::new(
        vec!["BBB".to_string(), "AAA".to_string()],
        ExportFormat::ItemWizard,
        temp.path(),
    )
    .with_combined(10);
    let report = executor
        .execute(job, &CancellationToken::new(), ProgressReporter::disabled())
        .await
        .unwrap();

    assert_eq!(report.status, JobStatus::Completed);
    assert!(!report.outcomes[0].is_success());
    assert_eq!(report.outcomes[0].set_code(), "BBB");
    assert!(report.outcomes[1].is_success());

    // Entries of the unwritten set are not aggregated
    assert_eq!(report.total_entries, 1);
    let combined = fs::read_to_string(&report.combined_files[0]).unwrap();
    assert_eq!(combined, "AAA 1,Alpha,,0,0.0,0,0,0,1.00\n");
}

#[tokio::test]
#[serial]
async fn test_combined_stage_failure_fails_job() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("00_combined_list.csv")).unwrap();

    let executor = executor(Arc::new(scenario_source()));
    let job = FetchJob::new(
        vec!["AAA".to_string(), "BBB".to_string()],
        ExportFormat::ImportUtility,
        temp.path(),
    )
    .with_combined(10);

    let (reporter, mut rx) = progress_channel();
    let result = executor
        .execute(job, &CancellationToken::new(), reporter)
        .await;

    match result {
        Err(PipelineError::CombinedOutput { report, .. }) => {
            assert_eq!(report.status, JobStatus::Failed);
            assert_eq!(report.outcomes.len(), 2);
            assert!(report.combined_files.is_empty());
            // Per-set output survives the combined failure
            assert!(temp.path().join("AAA_prices.csv").exists());
        }
        other => panic!("expected combined output failure, got {other:?}"),
    }

    let events = drain(&mut rx);
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Finished(JobStatus::Failed))
    );
}

#[tokio::test]
#[serial]
async fn test_later_batch_failure_leaves_no_combined_files() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("01_combined_list.csv")).unwrap();

    let executor = executor(Arc::new(scenario_source()));
    let job = FetchJob::new(vec!["AAA".to_string()], ExportFormat::ItemWizard, temp.path())
        .with_combined(1);

    let (reporter, mut rx) = progress_channel();
    let result = executor
        .execute(job, &CancellationToken::new(), reporter)
        .await;

    match result {
        Err(PipelineError::CombinedOutput { report, .. }) => {
            assert_eq!(report.status, JobStatus::Failed);
            assert!(report.combined_files.is_empty());
        }
        other => panic!("expected combined output failure, got {other:?}"),
    }

    // The report lists no combined files, so none may be left on disk
    assert!(!temp.path().join("00_combined_list.csv").exists());
    assert!(!temp.path().join("02_combined_list.csv").exists());
    assert!(temp.path().join("AAA_prices.csv").exists());

    let lines = log_lines(&drain(&mut rx));
    assert!(lines
        .iter()
        .any(|l| l.starts_with("✗ Combined files failed")));
}

#[tokio::test]
#[serial]
async fn test_combined_skipped_without_entries() {
    let temp = tempfile::tempdir().unwrap();
    let executor = executor(Arc::new(scenario_source()));

    let job = FetchJob::new(vec!["BBB".to_string()], ExportFormat::ItemWizard, temp.path())
        .with_combined(10);
    let report = executor
        .execute(job, &CancellationToken::new(), ProgressReporter::disabled())
        .await
        .unwrap();

    assert_eq!(report.status, JobStatus::Completed);
    assert!(report.combined_files.is_empty());
    assert!(!temp.path().join("00_combined_list.csv").exists());
}

#[tokio::test]
#[serial]
async fn test_zero_out_writes_wizard_sets_and_zero_out_combined() {
    let temp = tempfile::tempdir().unwrap();
    let executor = executor(Arc::new(scenario_source()));

    let job = FetchJob::new(vec!["AAA".to_string()], ExportFormat::ZeroOut, temp.path())
        .with_combined(10);
    let report = executor
        .execute(job, &CancellationToken::new(), ProgressReporter::disabled())
        .await
        .unwrap();

    let per_set = fs::read_to_string(temp.path().join("AAA_prices.csv")).unwrap();
    assert!(per_set.starts_with("AAA 1,Alpha,,0,0.0,0,0,0,3.00\n"));

    let combined = fs::read_to_string(&report.combined_files[0]).unwrap();
    assert_eq!(
        combined,
        "AAA 1,Alpha,,,0\nAAA 2,Beta,,,0\nAAA 2f,Beta,,,0\n"
    );
}

#[tokio::test]
#[serial]
async fn test_invalid_job_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let executor = executor(Arc::new(MockSource::new()));

    let empty = FetchJob::new(vec![], ExportFormat::ItemWizard, temp.path());
    assert!(matches!(
        executor
            .execute(empty, &CancellationToken::new(), ProgressReporter::disabled())
            .await,
        Err(PipelineError::Validation(_))
    ));

    let zero_split =
        FetchJob::new(vec!["AAA".to_string()], ExportFormat::ItemWizard, temp.path())
            .with_combined(0);
    assert!(matches!(
        executor
            .execute(zero_split, &CancellationToken::new(), ProgressReporter::disabled())
            .await,
        Err(PipelineError::Validation(_))
    ));
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_fetch_timeout_fails_set() {
    let temp = tempfile::tempdir().unwrap();
    let source = Arc::new(
        MockSource::new()
            .with_set("AAA", vec![])
            .with_latency(Duration::from_secs(60)),
    );
    let executor = executor(source).with_fetch_timeout(Duration::from_secs(5));

    let job = FetchJob::new(vec!["AAA".to_string()], ExportFormat::ItemWizard, temp.path());
    let report = executor
        .execute(job, &CancellationToken::new(), ProgressReporter::disabled())
        .await
        .unwrap();

    assert_eq!(
        report.outcomes,
        vec![FetchOutcome::Failure {
            set_code: "AAA".to_string(),
            error: "timeout".to_string()
        }]
    );
}
