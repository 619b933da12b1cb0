mod common;

use std::time::Duration;

use serial_test::serial;

use rainfall_ingest::db::ObservationRepository;
use rainfall_ingest::fetcher::SheetFetcher;
use rainfall_ingest::importers::SourceKind;
use rainfall_ingest::period::TargetMonth;
use rainfall_ingest::report::{SkipReason, SourceStatus};
use rainfall_ingest::services::IngestService;

fn service() -> IngestService {
    let fetcher = SheetFetcher::new(5, 0)
        .unwrap()
        .with_min_retry_delay(Duration::from_millis(10));
    IngestService::new(fetcher)
}

#[tokio::test]
async fn test_prepare_continues_past_failed_source() {
    let mut server = mockito::Server::new_async().await;
    let _rain = server
        .mock("GET", "/rain.csv")
        .with_status(200)
        .with_body(common::rainfall_csv(
            "Pos Sangatta",
            "0.4,117.5",
            &[("01", "4"), ("02", "")],
        ))
        .create_async()
        .await;
    let _map = server
        .mock("GET", "/map.csv")
        .with_status(200)
        .with_body("date,url_peta\n2024-03-02,https://peta.example/0302\n")
        .create_async()
        .await;
    let _gone = server
        .mock("GET", "/gone.csv")
        .with_status(404)
        .create_async()
        .await;

    let sources = vec![
        format!("{}/rain.csv", server.url()),
        format!("{}/gone.csv", server.url()),
        format!("{}/map.csv", server.url()),
    ];
    let target = TargetMonth::new(2024, 3).unwrap();

    let prepared = service().prepare(&sources, target).await;

    assert_eq!(prepared.records.len(), 2);
    assert_eq!(
        prepared.records[1].link_peta.as_deref(),
        Some("https://peta.example/0302")
    );

    let report = &prepared.report;
    assert_eq!(report.records_built, 2);
    assert_eq!(report.skipped_sources(), 1);
    assert!(!report.loaded);

    let failed = &report.sources[0];
    assert_eq!(failed.source, sources[1]);
    assert_eq!(failed.kind, None);
    assert!(matches!(
        failed.status,
        SourceStatus::Skipped(SkipReason::FetchFailed(_))
    ));
    assert!(report.sources.iter().any(|s| s.kind == Some(SourceKind::MapReferenceTable)
        && s.status == SourceStatus::Processed { produced: 1 }));
}

#[tokio::test]
async fn test_prepare_with_only_failures_builds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv").to_string_lossy().into_owned();
    let target = TargetMonth::new(2024, 2).unwrap();

    let prepared = service().prepare(&[missing], target).await;

    assert!(prepared.records.is_empty());
    assert_eq!(prepared.report.skipped_sources(), 1);
}

#[tokio::test]
#[serial]
async fn test_run_with_no_records_leaves_month_untouched() {
    let repo = ObservationRepository::new(common::test_pool().await.clone());
    let target = TargetMonth::new(2098, 5).unwrap();

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    std::io::Write::write_all(
        &mut file,
        common::rainfall_csv("Pos Keep", "", &[("01", "3")]).as_bytes(),
    )
    .unwrap();
    let source = file.path().to_string_lossy().into_owned();

    let first = service()
        .run(&repo, std::slice::from_ref(&source), target)
        .await
        .unwrap();
    assert!(first.loaded);
    assert_eq!(first.rows_inserted, 1);

    let unknown = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    std::fs::write(unknown.path(), "catatan\nkosong\n").unwrap();
    let second = service()
        .run(&repo, &[unknown.path().to_string_lossy().into_owned()], target)
        .await
        .unwrap();

    assert!(!second.loaded);
    assert_eq!(second.rows_deleted, 0);
    assert_eq!(repo.count_by_month(target).await.unwrap(), 1);
}
