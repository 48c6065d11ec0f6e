use clap::Parser;
use scout_cli::{run, run_with_config, Cli, RunSummary};
use scout_core::{ReporterConfig, ScoutMeta};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["scout-report"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

/// Collector that answers every request with 503.
async fn unavailable_collector() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if request_complete(&buf) {
                    break;
                }
            }
            let reply = "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 4\r\nconnection: close\r\n\r\ndown";
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}/scout", addr)
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(split) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&buf[..split]);
    let length: usize = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0);
    buf.len() >= split + 4 + length
}

/// Reporter settings that ignore SCOUT_DISABLE and SCOUT_ENDPOINT.
fn enabled_config(endpoint: &str) -> ReporterConfig {
    ReporterConfig {
        endpoint: endpoint.to_string(),
        disabled: false,
        ..ReporterConfig::default()
    }
}

#[test]
fn test_parse_actions_and_meta() {
    let cli = parse(&[
        "--mode",
        "install",
        "--install-id",
        "uid-123",
        "--action",
        "install_started",
        "--action",
        "install_finished",
        "--meta",
        "status=ok",
        "--meta",
        "attempt=2",
    ]);
    assert_eq!(cli.mode, "install");
    assert_eq!(cli.actions, vec!["install_started", "install_finished"]);
    assert_eq!(
        cli.meta,
        vec![ScoutMeta::new("status", "ok"), ScoutMeta::new("attempt", json!(2))]
    );
    assert!(!cli.dry_run);
}

#[test]
fn test_parse_rejects_bad_input() {
    let missing_action = Cli::try_parse_from(["scout-report", "--mode", "install", "--install-id", "x"]);
    assert!(missing_action.is_err());

    let bad_meta = Cli::try_parse_from([
        "scout-report",
        "--mode",
        "install",
        "--install-id",
        "x",
        "--action",
        "a",
        "--meta",
        "novalue",
    ]);
    assert!(bad_meta.is_err());
}

#[test]
fn test_reporter_config_layers() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("scout.toml");
    std::fs::write(&path, "application = \"installer\"\nendpoint = \"http://file/x\"\n").unwrap();

    let cli = parse(&[
        "--mode",
        "update",
        "--install-id",
        "uid",
        "--action",
        "a",
        "--config",
        path.to_str().unwrap(),
        "--endpoint",
        "http://flag/y",
    ]);
    let config = cli.reporter_config().unwrap();
    assert_eq!(config.application, "installer");
    assert_eq!(config.endpoint, "http://flag/y");
}

#[test]
fn test_missing_config_file_is_an_error() {
    let cli = parse(&[
        "--mode",
        "update",
        "--install-id",
        "uid",
        "--action",
        "a",
        "--config",
        "/nonexistent/scout.toml",
    ]);
    let err = cli.reporter_config().unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load config"));
}

#[tokio::test]
async fn test_dry_run_reports_every_action() {
    let cli = parse(&[
        "--mode",
        "install",
        "--install-id",
        "uid-123",
        "--action",
        "install_started",
        "--action",
        "install_finished",
        "--dry-run",
    ]);
    let summary = run(&cli).await.unwrap();
    assert_eq!(
        summary,
        RunSummary {
            sent: 2,
            failed: 0,
            skipped: 0
        }
    );
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_failure_stops_remaining_actions() {
    let endpoint = unavailable_collector().await;
    let cli = parse(&[
        "--mode",
        "install",
        "--install-id",
        "uid",
        "--action",
        "a",
        "--action",
        "b",
        "--action",
        "c",
    ]);
    let summary = run_with_config(&cli, &enabled_config(&endpoint)).await.unwrap();
    assert_eq!(
        summary,
        RunSummary {
            sent: 0,
            failed: 1,
            skipped: 2
        }
    );
    assert!(!summary.is_success());
}

#[tokio::test]
async fn test_keep_going_attempts_every_action() {
    let endpoint = unavailable_collector().await;
    let cli = parse(&[
        "--mode",
        "install",
        "--install-id",
        "uid",
        "--action",
        "a",
        "--action",
        "b",
        "--keep-going",
    ]);
    let summary = run_with_config(&cli, &enabled_config(&endpoint)).await.unwrap();
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.skipped, 0);
}

#[tokio::test]
async fn test_disabled_reports_count_as_sent() {
    let endpoint = unavailable_collector().await;
    let cli = parse(&[
        "--mode",
        "install",
        "--install-id",
        "uid",
        "--action",
        "a",
        "--action",
        "b",
    ]);
    let config = ReporterConfig {
        disabled: true,
        ..enabled_config(&endpoint)
    };
    let summary = run_with_config(&cli, &config).await.unwrap();
    assert_eq!(
        summary,
        RunSummary {
            sent: 2,
            failed: 0,
            skipped: 0
        }
    );
}

#[test]
fn test_help_explains_disabled_reports() {
    use clap::CommandFactory;
    let help = Cli::command().render_long_help().to_string();
    assert!(help.contains("counted as sent"));
}
