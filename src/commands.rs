use std::fs;

use lastseen::api::models::{LastSeenResponse, RecentEventsResponse};
use lastseen::config::Config;
use lastseen::ledger::{self, Event, Ledger, SubjectId, Timestamp, open_store};
use lastseen::query::{InactivityQuery, RosterEntry, report_page};
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Commands, ImportArgs, InactiveArgs, RecordArgs};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(cli: Cli) -> Result<(), AnyError> {
    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Record(args) => record(&config, args),
        Commands::LastSeen(args) => {
            let ledger = open_ledger(&config)?;
            let subject_id = SubjectId::new(args.subject);
            match ledger.last_seen(&subject_id) {
                Some(last_seen) => print_json(&LastSeenResponse {
                    subject_id,
                    last_seen,
                }),
                None => Err(format!("subject {subject_id} has never been seen").into()),
            }
        }
        Commands::Recent(args) => {
            let ledger = open_ledger(&config)?;
            let limit = args.limit.unwrap_or(config.query.recent_limit);
            print_json(&RecentEventsResponse {
                events: ledger.recent_events(limit),
            })
        }
        Commands::Inactive(args) => inactive(&config, args),
        Commands::Import(args) => import(&config, args),
        Commands::Server(args) => {
            let address = args.address.unwrap_or(config.server.bind_addr);
            lastseen::api::run(address, config).await
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn open_ledger(config: &Config) -> Result<Ledger, AnyError> {
    let store = open_store(&config.ledger)?;
    Ok(Ledger::open(store, config.ledger.capacity)?)
}

fn record(config: &Config, args: RecordArgs) -> Result<(), AnyError> {
    let mut ledger = open_ledger(config)?;
    let event = Event::new(
        args.subject,
        args.kind,
        args.at.unwrap_or_else(Timestamp::now),
    );
    ledger.record_event(event.clone())?;
    print_json(&event)
}

fn inactive(config: &Config, args: InactiveArgs) -> Result<(), AnyError> {
    let threshold = args.threshold.unwrap_or(config.query.inactivity_threshold);
    let query = InactivityQuery::try_new(threshold.as_duration())?;

    let roster: Vec<RosterEntry> = serde_json::from_slice(&fs::read(&args.roster)?)?;
    let ledger = open_ledger(config)?;

    let classified = query.classify(&roster, &ledger, Timestamp::now());
    let report = report_page(classified, args.all, config.query.page_size, args.page)?;
    print_json(&report)
}

fn import(config: &Config, args: ImportArgs) -> Result<(), AnyError> {
    let bytes = fs::read(&args.legacy)?;
    let location = args.legacy.display().to_string();
    let snapshot = ledger::legacy::import(&bytes, &location)?;

    let store = open_store(&config.ledger)?;
    let ledger = Ledger::import(store, snapshot, config.ledger.capacity)?;
    info!(
        events = ledger.len(),
        subjects = ledger.subject_count(),
        from = %location,
        "Imported legacy ledger"
    );

    print_json(&serde_json::json!({
        "events": ledger.len(),
        "subjects": ledger.subject_count(),
    }))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AnyError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
