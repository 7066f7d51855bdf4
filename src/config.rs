use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use serde::Deserialize;

use crate::util;

pub const DEFAULT_HOST: &str = "mqtt.cetools.org";
pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_KEEPALIVE_SECS: u64 = 60;
pub const DEFAULT_TARGET_COUNT: usize = 200;

/// Expected payload shape, shown to the operator in banners.
pub const EXPECTED_FORMAT: &str = "{speed:X.XX,direction:XXX}";

// ------------------------------------------------------------
// Command line
// ------------------------------------------------------------
//
// Every flag is optional. Values given here override the
// JSON config file; values missing from both are prompted for
// (topic, output) or defaulted (everything else).
//
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// MQTT broker host
    #[arg(long)]
    pub host: Option<String>,

    /// MQTT broker port
    #[arg(long)]
    pub port: Option<u16>,

    /// MQTT keepalive in seconds
    #[arg(long)]
    pub keepalive: Option<u64>,

    /// Topic to subscribe to
    #[arg(long)]
    pub topic: Option<String>,

    /// CSV file to write (".csv" is appended if missing)
    #[arg(long)]
    pub output: Option<String>,

    /// Number of valid readings to collect before stopping
    #[arg(long)]
    pub target: Option<usize>,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

// ------------------------------------------------------------
// Config file
// ------------------------------------------------------------
//
// Optional JSON file. Every field may be omitted:
//
// {
//   "broker": { "host": "mqtt.cetools.org", "port": 1883,
//               "keepalive_secs": 60, "client_id": "wind-1" },
//   "topic": "weather/wind",
//   "output": "wind_data.csv",
//   "target_count": 200,
//   "debug": { "log_payloads": true }
// }
//
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub broker: FileBrokerConfig,
    pub topic: Option<String>,
    pub output: Option<String>,
    pub target_count: Option<usize>,
    pub debug: Option<DebugConfig>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileBrokerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub keepalive_secs: Option<u64>,
    pub client_id: Option<String>,
}

// ------------------------------------------------------------
// Debug configuration
// ------------------------------------------------------------
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DebugConfig {
    /// Log every raw payload at debug level, accepted or not
    pub log_payloads: Option<bool>,
}

// ------------------------------------------------------------
// Resolved configuration
// ------------------------------------------------------------
//
// The fully resolved value handed to the collector. Nothing
// downstream of this point prompts or reads files.
//
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub keepalive_secs: u64,
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub broker: BrokerConfig,
    pub topic: String,
    pub output: PathBuf,
    pub target_count: usize,
    pub log_payloads: bool,
}

/// Reads a JSON configuration file from disk.
pub fn load_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg = serde_json::from_str(&data)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(cfg)
}

/// Merges CLI flags over file values over defaults.
///
/// `ask` is called for the output filename and the topic when
/// neither source provides them. It receives the question text
/// and returns the operator's raw answer.
pub fn resolve<F>(args: &Args, file: FileConfig, mut ask: F) -> anyhow::Result<Config>
where
    F: FnMut(&str) -> anyhow::Result<String>,
{
    let output = match args.output.clone().or(file.output) {
        Some(o) => o,
        None => ask("Enter the CSV filename to save wind data (e.g., 'wind_data.csv'): ")?,
    };
    // An empty answer still gets the suffix and becomes ".csv"
    let output = output.trim();

    let topic = match args.topic.clone().or(file.topic) {
        Some(t) => t,
        None => ask("Enter the MQTT topic to subscribe to (e.g., 'weather/wind'): ")?,
    };
    let topic = topic.trim().to_string();
    if topic.is_empty() {
        bail!("Topic cannot be empty!");
    }

    let target_count = args
        .target
        .or(file.target_count)
        .unwrap_or(DEFAULT_TARGET_COUNT);
    if target_count == 0 {
        bail!("Target count must be at least 1");
    }

    let port = args.port.or(file.broker.port).unwrap_or(DEFAULT_PORT);
    if port == 0 {
        bail!("Broker port must be non-zero");
    }

    let broker = BrokerConfig {
        host: args
            .host
            .clone()
            .or(file.broker.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port,
        keepalive_secs: args
            .keepalive
            .or(file.broker.keepalive_secs)
            .unwrap_or(DEFAULT_KEEPALIVE_SECS),
        client_id: file
            .broker
            .client_id
            .unwrap_or_else(|| format!("wind-collector-{}", std::process::id())),
    };

    Ok(Config {
        broker,
        topic,
        output: PathBuf::from(util::ensure_csv_suffix(output)),
        target_count,
        log_payloads: file
            .debug
            .and_then(|d| d.log_payloads)
            .unwrap_or(false),
    })
}

/// Prints the settings banner shown before confirmation.
pub fn print_settings(cfg: &Config) {
    println!("\nSettings:");
    println!("  MQTT Host: {}:{}", cfg.broker.host, cfg.broker.port);
    println!("  Topic: {}", cfg.topic);
    println!("  CSV File: {}", cfg.output.display());
    println!("  Target readings: {}", cfg.target_count);
    println!("  Expected format: {}", EXPECTED_FORMAT);
}

/// Interprets a y/N answer. Only "y" and "yes" proceed.
pub fn is_confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prints `question` and reads one line from stdin.
pub fn prompt_stdin(question: &str) -> anyhow::Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_prompt(q: &str) -> anyhow::Result<String> {
        panic!("unexpected prompt: {q}");
    }

    fn args(topic: &str, output: &str) -> Args {
        Args {
            topic: Some(topic.into()),
            output: Some(output.into()),
            ..Args::default()
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = resolve(&args("weather/wind", "wind"), FileConfig::default(), no_prompt).unwrap();

        assert_eq!(cfg.broker.host, DEFAULT_HOST);
        assert_eq!(cfg.broker.port, 1883);
        assert_eq!(cfg.broker.keepalive_secs, 60);
        assert_eq!(cfg.target_count, 200);
        assert_eq!(cfg.output, PathBuf::from("wind.csv"));
        assert!(!cfg.log_payloads);
    }

    #[test]
    fn cli_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{"broker":{"host":"file-host","port":1884},"topic":"file/topic","target_count":5}"#,
        )
        .unwrap();
        let a = Args {
            host: Some("cli-host".into()),
            target: Some(10),
            ..args("cli/topic", "out.csv")
        };

        let cfg = resolve(&a, file, no_prompt).unwrap();
        assert_eq!(cfg.broker.host, "cli-host");
        assert_eq!(cfg.broker.port, 1884);
        assert_eq!(cfg.topic, "cli/topic");
        assert_eq!(cfg.target_count, 10);
    }

    #[test]
    fn missing_values_are_prompted() {
        let mut answers = vec!["  weather/wind ".to_string(), "data".to_string()];
        let cfg = resolve(&Args::default(), FileConfig::default(), |_| {
            Ok(answers.pop().unwrap())
        })
        .unwrap();

        assert_eq!(cfg.output, PathBuf::from("data.csv"));
        assert_eq!(cfg.topic, "weather/wind");
    }

    #[test]
    fn empty_topic_is_rejected() {
        let err = resolve(&args("   ", "out"), FileConfig::default(), no_prompt).unwrap_err();
        assert!(err.to_string().contains("Topic cannot be empty"));
    }

    #[test]
    fn empty_output_becomes_bare_suffix() {
        let cfg = resolve(&args("weather/wind", "  "), FileConfig::default(), no_prompt).unwrap();
        assert_eq!(cfg.output, PathBuf::from(".csv"));
    }

    #[test]
    fn zero_target_is_rejected() {
        let a = Args { target: Some(0), ..args("t", "o") };
        assert!(resolve(&a, FileConfig::default(), no_prompt).is_err());
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(serde_json::from_str::<FileConfig>(r#"{"topik":"x"}"#).is_err());
    }

    #[test]
    fn debug_flag_is_read_from_file() {
        let file: FileConfig =
            serde_json::from_str(r#"{"debug":{"log_payloads":true}}"#).unwrap();
        let cfg = resolve(&args("t", "o"), file, no_prompt).unwrap();
        assert!(cfg.log_payloads);
    }

    #[test]
    fn load_file_config_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"topic":"a/b","broker":{"client_id":"me"}}"#).unwrap();

        let file = load_file_config(&path).unwrap();
        assert_eq!(file.topic.as_deref(), Some("a/b"));
        assert_eq!(file.broker.client_id.as_deref(), Some("me"));
    }

    #[test]
    fn load_file_config_reports_missing_file() {
        let err = load_file_config(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn confirmation_accepts_only_yes() {
        assert!(is_confirmed("y"));
        assert!(is_confirmed(" YES "));
        assert!(!is_confirmed(""));
        assert!(!is_confirmed("n"));
        assert!(!is_confirmed("yep"));
    }
}
