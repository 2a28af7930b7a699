use cnc_intake::events::LoggingEventHandler;
use cnc_intake::intake::{IntakeSession, SelectedFile};
use cnc_intake::logging::read_component_logs;
use cnc_intake::shutdown::ShutdownCoordinator;
use std::time::Duration;

// HOME is process-wide, so this file holds a single test.
#[tokio::test]
async fn test_each_rejection_is_logged_once() {
    let home = tempfile::tempdir().unwrap();
    std::env::set_var("HOME", home.path());

    let session = IntakeSession::default();
    let report = session.intake(vec![SelectedFile::new("drawing.dwg", 10)]);
    assert_eq!(report.rejected_reasons.len(), 1);
    // Intake itself never touches the log directory
    assert!(!home.path().join(".cnc-intake").exists());

    let shutdown = ShutdownCoordinator::new();
    let handler = LoggingEventHandler::new(session.event_bus().clone(), shutdown.clone()).start();
    session.intake(vec![SelectedFile::new("drawing.dwg", 10)]);

    tokio::time::sleep(Duration::from_millis(50)).await;
    session.teardown();
    shutdown.shutdown();
    tokio::time::timeout(Duration::from_secs(1), handler)
        .await
        .unwrap()
        .unwrap();

    let entries = read_component_logs("intake", None).unwrap();
    let hits: Vec<_> = entries
        .iter()
        .filter(|e| e.message.contains("drawing.dwg"))
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].level, "WARN");
}
