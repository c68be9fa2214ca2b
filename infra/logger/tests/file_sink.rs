use automata_logger::{LevelFilter, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn file_sink_writes_prefixed_log_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("automata-file-sink")
        .console(false)
        .level(LevelFilter::INFO)
        .directory(&log_dir)
        .retained_files(2)
        .init()?;
    assert!(logger.writes_files());

    tracing::info!(feature = "health", "feature registered");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let file_name = log_file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(file_name.starts_with("automata-file-sink"));

    let contents = fs::read_to_string(&log_file)?;
    assert!(contents.contains("feature registered"));
    Ok(())
}
