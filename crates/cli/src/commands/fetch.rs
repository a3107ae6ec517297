//! `gleaner fetch`: run one aggregation from the command line.
//!
//! Entries are `key` or `key=<JSON object>`. The aggregated mapping is
//! printed to stdout as JSON; per-key failures go to stderr.

use std::sync::Arc;

use clap::Args;
use gleaner_config::GleanerConfig;
use gleaner_context::{Context, FetchRequest};
use gleaner_core::{DomainEvent, EventBus, Params};
use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Fetch entries: `key` or `key={"param":"value"}`
    #[arg(required = true)]
    pub entries: Vec<String>,

    /// JSON object layered over the configured base data
    #[arg(short, long)]
    pub base: Option<String>,

    /// Run the fetches concurrently
    #[arg(long)]
    pub concurrent: bool,

    /// Exit with an error if any fetch failed
    #[arg(long)]
    pub strict: bool,
}

impl FetchArgs {
    /// `--concurrent` or `fetch.concurrent` in the config.
    pub fn runs_concurrently(&self, config: &GleanerConfig) -> bool {
        self.concurrent || config.fetch.concurrent
    }
}

pub async fn run(
    config: &GleanerConfig,
    args: FetchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = aggregate(config, &args).await?;

    println!("{}", serde_json::to_string_pretty(&context.to_mapping())?);

    for (key, error) in context.errors() {
        let note = if context.get(key.as_str()).is_some() {
            " (served fallback data)"
        } else {
            ""
        };
        eprintln!("⚠️  {error}{note}");
    }

    if args.strict {
        check_strict(&context)?;
    }

    Ok(())
}

/// Build the registry from `config` and run every entry in `args`.
///
/// Fails on malformed entries and unregistered keys. Fetcher failures are
/// recorded in the returned Context.
pub async fn aggregate(
    config: &GleanerConfig,
    args: &FetchArgs,
) -> Result<Context, Box<dyn std::error::Error>> {
    let events = Arc::new(EventBus::new(config.events.capacity));
    tokio::spawn(log_events(events.subscribe()));

    let registry = Arc::new(gleaner_fetchers::default_registry(config, Some(events))?);

    let mut base_data = config.base_data.clone();
    if let Some(base) = &args.base {
        base_data.extend(parse_object(base, "--base")?);
    }

    let entries = args
        .entries
        .iter()
        .map(|e| parse_entry(e))
        .collect::<Result<Vec<_>, _>>()?;

    let mut context = Context::new(registry, base_data);
    if args.runs_concurrently(config) {
        context.fetch_concurrent(entries).await?;
    } else {
        context.fetch_multiple(entries).await?;
    }

    Ok(context)
}

/// The `--strict` verdict: an error naming the failed keys, if any.
pub fn check_strict(context: &Context) -> Result<(), String> {
    if !context.has_errors() {
        return Ok(());
    }
    let keys: Vec<String> = context.error_keys().iter().map(|k| k.to_string()).collect();
    Err(format!("{} fetch(es) failed: {}", keys.len(), keys.join(", ")))
}

/// Parse `key` or `key=<JSON object>`.
pub fn parse_entry(entry: &str) -> Result<FetchRequest, String> {
    match entry.split_once('=') {
        None => Ok(FetchRequest::from(entry)),
        Some((key, json)) => Ok(FetchRequest::from((key, parse_object(json, key)?))),
    }
}

fn parse_object(json: &str, what: &str) -> Result<Params, String> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("{what}: expected a JSON object, got {other}")),
        Err(e) => Err(format!("{what}: invalid JSON: {e}")),
    }
}

/// Log domain events until the bus closes. Returns how many were logged.
async fn log_events(mut rx: broadcast::Receiver<Arc<DomainEvent>>) -> usize {
    let mut logged = 0;
    loop {
        match rx.recv().await {
            Ok(event) => {
                debug!(?event, "Domain event");
                logged += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event logger lagged behind the bus");
            }
            Err(RecvError::Closed) => return logged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gleaner_config::StaticFetcherConfig;
    use serde_json::json;

    fn static_fetcher(key: &str, data: Option<Value>) -> StaticFetcherConfig {
        StaticFetcherConfig {
            key: key.into(),
            description: String::new(),
            data: data.map(|value| match value {
                Value::Object(map) => map,
                other => panic!("expected a JSON object, got {other}"),
            }),
            fallback: None,
            allowed_params: vec![],
            enabled: true,
        }
    }

    /// `echo`, a working `company` source and a `down` source with no data.
    fn config() -> GleanerConfig {
        let mut config = GleanerConfig::default();
        config.base_data.insert("workspace".into(), json!("acme"));
        config.base_data.insert("user".into(), json!({ "id": 1 }));
        config
            .static_fetchers
            .push(static_fetcher("company", Some(json!({ "name": "Acme Corp" }))));
        config.static_fetchers.push(static_fetcher("down", None));
        config
    }

    fn args(entries: &[&str]) -> FetchArgs {
        FetchArgs {
            entries: entries.iter().map(|e| e.to_string()).collect(),
            base: None,
            concurrent: false,
            strict: false,
        }
    }

    #[tokio::test]
    async fn aggregate_layers_base_flag_over_config_base() {
        let mut args = args(&["echo"]);
        args.base = Some(r#"{"workspace":"override","extra":true}"#.into());

        let context = aggregate(&config(), &args).await.unwrap();
        let mapping = context.to_mapping();

        assert_eq!(mapping["workspace"], "override");
        assert_eq!(mapping["extra"], true);
        assert_eq!(mapping["user"]["id"], 1);
        assert_eq!(mapping["echo"]["workspace"], "override");
        assert_eq!(mapping["echo"]["user"]["id"], 1);
    }

    #[tokio::test]
    async fn aggregate_rejects_non_object_base() {
        let mut args = args(&["echo"]);
        args.base = Some("[1]".into());
        let err = aggregate(&config(), &args).await.unwrap_err();
        assert!(err.to_string().contains("--base: expected a JSON object"));
    }

    #[tokio::test]
    async fn aggregate_records_failures_without_aborting() {
        let context = aggregate(&config(), &args(&["company", "down", "echo"]))
            .await
            .unwrap();

        assert!(context.is_success("company"));
        assert!(context.is_success("echo"));
        assert!(context.is_error("down"));
        assert!(!context.to_mapping().contains_key("down"));
    }

    #[tokio::test]
    async fn strict_fails_when_any_fetch_failed() {
        let context = aggregate(&config(), &args(&["echo", "down"])).await.unwrap();
        let err = check_strict(&context).unwrap_err();
        assert_eq!(err, "1 fetch(es) failed: down");

        let context = aggregate(&config(), &args(&["echo", "company"])).await.unwrap();
        assert!(check_strict(&context).is_ok());
    }

    #[tokio::test]
    async fn unregistered_key_reports_its_message() {
        let err = aggregate(&config(), &args(&["echo", "missing"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No fetcher registered for key: missing");
    }

    #[tokio::test]
    async fn concurrent_flag_or_config_selects_concurrent_path() {
        let mut config = config();
        let mut args = args(&["company", r#"echo={"n":1}"#, "down"]);
        assert!(!args.runs_concurrently(&config));

        let sequential = aggregate(&config, &args).await.unwrap();

        args.concurrent = true;
        assert!(args.runs_concurrently(&config));
        let concurrent = aggregate(&config, &args).await.unwrap();

        args.concurrent = false;
        config.fetch.concurrent = true;
        assert!(args.runs_concurrently(&config));

        assert_eq!(sequential.to_mapping(), concurrent.to_mapping());
        assert_eq!(sequential.errors(), concurrent.errors());
        assert_eq!(concurrent.get("echo").unwrap()["n"], 1);
    }

    #[tokio::test]
    async fn concurrent_path_fails_before_fetching_on_unregistered_key() {
        let mut args = args(&["echo", "missing"]);
        args.concurrent = true;
        let err = aggregate(&config(), &args).await.unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn event_logger_survives_lag() {
        let bus = EventBus::new(1);
        let rx = bus.subscribe();
        for removed in 0..3 {
            bus.publish(DomainEvent::RegistryCleared {
                removed,
                timestamp: chrono::Utc::now(),
            });
        }
        drop(bus);

        // Two events were overwritten; the newest one is still logged
        assert_eq!(log_events(rx).await, 1);
    }

    #[test]
    fn bare_entry_is_a_key() {
        assert_eq!(parse_entry("user").unwrap(), FetchRequest::from("user"));
    }

    #[test]
    fn entry_with_params() {
        let request = parse_entry(r#"search={"query":"fn main","limit":3}"#).unwrap();
        let (key, params) = request.into_parts();
        assert_eq!(key, "search");
        assert_eq!(params["query"], "fn main");
        assert_eq!(params["limit"], 3);
    }

    #[test]
    fn non_object_params_rejected() {
        let err = parse_entry("search=[1,2]").unwrap_err();
        assert!(err.contains("expected a JSON object"));
    }

    #[test]
    fn malformed_params_rejected() {
        let err = parse_entry("search={oops").unwrap_err();
        assert!(err.contains("invalid JSON"));
    }
}
