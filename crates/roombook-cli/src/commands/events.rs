//! Events on the primary Google calendar.

use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use roombook_core::{EventTime, NewEvent, TokenSet};

use super::{integration, print_json, CmdResult};

#[derive(Subcommand)]
pub enum EventsAction {
    /// List events in a time window (default: the next 7 days)
    List {
        /// Window start, RFC 3339
        #[arg(long)]
        from: Option<String>,
        /// Window end, RFC 3339
        #[arg(long)]
        to: Option<String>,
    },
    /// Create an event
    Create {
        #[arg(long)]
        summary: String,
        #[arg(long)]
        description: Option<String>,
        /// Start date-time, RFC 3339
        #[arg(long)]
        start: String,
        /// End date-time, RFC 3339
        #[arg(long)]
        end: String,
        /// IANA time zone, e.g. Europe/Stockholm
        #[arg(long, default_value = "UTC")]
        time_zone: String,
    },
    /// Delete an event by id
    Delete { event_id: String },
}

pub async fn run(action: EventsAction, access_token: Option<&str>) -> CmdResult {
    let integration = integration()?;
    if let Some(token) = access_token {
        integration.oauth().set_credentials(TokenSet {
            access_token: token.to_string(),
            refresh_token: None,
            expires_at: None,
            token_type: "Bearer".to_string(),
            scope: None,
        });
    }

    match action {
        EventsAction::List { from, to } => {
            let now = Utc::now();
            let from = match from {
                Some(s) => parse_instant("--from", &s)?,
                None => now,
            };
            let to = match to {
                Some(s) => parse_instant("--to", &s)?,
                None => from + Duration::days(7),
            };
            let events = integration
                .get_events(&from.to_rfc3339(), &to.to_rfc3339())
                .await?;
            print_json(&events)?;
        }
        EventsAction::Create {
            summary,
            description,
            start,
            end,
            time_zone,
        } => {
            let start_at = parse_instant("--start", &start)?;
            let end_at = parse_instant("--end", &end)?;
            if end_at <= start_at {
                return Err("--end must be after --start".into());
            }
            let event = NewEvent {
                summary,
                description,
                start: EventTime {
                    date_time: start,
                    time_zone: time_zone.clone(),
                },
                end: EventTime {
                    date_time: end,
                    time_zone,
                },
            };
            let created = integration.create_event(&event).await?;
            print_json(&created)?;
        }
        EventsAction::Delete { event_id } => {
            integration.delete_event(&event_id).await?;
            println!("deleted {event_id}");
        }
    }
    Ok(())
}

fn parse_instant(flag: &str, value: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("{flag}: invalid RFC 3339 date-time '{value}': {e}").into())
}
