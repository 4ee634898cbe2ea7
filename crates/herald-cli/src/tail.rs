use herald_client::{
    ClientConfig, ConnectionState, NotificationClient, NotificationRecord, WsTransport,
};
use herald_core::Topic;
use tokio::sync::broadcast::error::RecvError;

/// Stream notifications until interrupted or the reconnect budget runs out.
pub async fn run(
    config: ClientConfig,
    token: String,
    topics: Vec<Topic>,
    json: bool,
) -> anyhow::Result<()> {
    let transport = WsTransport::new(&config.url, config.handshake_timeout());
    tracing::info!("connecting to {}", transport.url());
    let client = NotificationClient::new(transport, config);
    let mut incoming = client.notifications();
    let mut status = client.status();

    client.connect(token)?;
    // Set while a scheduled retry is outstanding, so the Disconnected state
    // it publishes does not spend another attempt.
    let mut retrying = false;

    let outcome = loop {
        tokio::select! {
            received = incoming.recv() => match received {
                Ok(record) => print_record(&record, json)?,
                Err(RecvError::Lagged(n)) => tracing::warn!("dropped {} notifications", n),
                Err(RecvError::Closed) => break Ok(()),
            },
            changed = status.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let state = *status.borrow_and_update();
                match state {
                    ConnectionState::Connected => {
                        retrying = false;
                        tracing::info!("connected");
                        for topic in &topics {
                            client.subscribe(topic.clone())?;
                        }
                    }
                    ConnectionState::Disconnected if retrying => {}
                    ConnectionState::Disconnected | ConnectionState::Errored => {
                        if let Some(err) = client.last_error() {
                            tracing::warn!("{}", err);
                        }
                        // Gives up with MaxAttemptsReached once the budget is spent.
                        if let Err(err) = client.reconnect() {
                            break Err(err.into());
                        }
                        retrying = true;
                    }
                    ConnectionState::Connecting => retrying = false,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break Ok(());
            }
        }
    };

    let stats = client.stats();
    tracing::info!("received {} notifications, sent {}", stats.received, stats.sent);
    client.shutdown();
    outcome
}

fn print_record(record: &NotificationRecord, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(record)?);
    } else {
        println!("{}", format_record(record));
    }
    Ok(())
}

pub fn format_record(record: &NotificationRecord) -> String {
    let marker = if record.read { ' ' } else { '*' };
    let when = record
        .created_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    format!(
        "{marker} #{} [{}] {} {}",
        record.id, record.category, when, record.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unread_records_are_marked() {
        let record = NotificationRecord::new(7, "Task assigned", 3).with_category("task");
        assert_eq!(format_record(&record), "* #7 [task]  Task assigned");
    }
}
