use std::future::Future;
use std::sync::atomic::Ordering;

use anyhow::bail;
use log::{debug, info, warn};

use crate::{
    config::{Config, EXPECTED_FORMAT},
    metrics::METRICS,
    report,
    stats::Summary,
    transport::{Transport, TransportEvent},
    util,
};

use super::session::{Session, Step};

/// How a collection run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Target count reached; file written.
    Completed(Summary),

    /// Interrupted with at least one reading; file written.
    Interrupted(Summary),

    /// Interrupted before any reading arrived; nothing written.
    NoData,
}

/// Runs one collection until the target count or `shutdown`.
///
/// This loop:
/// - Feeds every transport event into the session
/// - Subscribes whenever the session asks for it
/// - Finalizes when the target count is reached
/// - Finalizes with partial data when `shutdown` resolves
///
/// GUARANTEES:
/// - Events are applied one at a time, in arrival order
/// - No event is applied after finalize
///
/// ERRORS:
/// - Broker refused the connection
/// - Transport failure before the first connection
/// - Output file could not be written
///
pub async fn run_collection<T, S>(
    transport: &mut T,
    cfg: &Config,
    shutdown: S,
) -> anyhow::Result<Outcome>
where
    T: Transport + ?Sized,
    S: Future<Output = ()>,
{
    let mut session = Session::new(cfg.topic.clone(), cfg.target_count);
    tokio::pin!(shutdown);

    println!(
        "Connecting to MQTT broker: {}:{}",
        cfg.broker.host, cfg.broker.port
    );
    session.start_connecting();

    loop {
        let event = tokio::select! {
            biased;

            _ = &mut shutdown => {
                return interrupt(transport, &mut session, cfg).await;
            }

            event = transport.next_event() => event?,
        };

        if let TransportEvent::Message { topic, payload } = &event {
            METRICS.messages_received.fetch_add(1, Ordering::Relaxed);
            if cfg.log_payloads {
                debug!("[{}] {} <- {}", transport.name(), topic, String::from_utf8_lossy(payload));
            }
        }

        match session.handle(event) {
            Step::Idle => {}

            Step::Subscribe { topic, first } => {
                transport.subscribe(&topic).await?;
                METRICS.subscriptions_sent.fetch_add(1, Ordering::Relaxed);

                if first {
                    print_start_banner(cfg);
                } else {
                    info!("Reconnected, resubscribed to {}", topic);
                }
                debug!("session state: {:?}", session.state());
            }

            Step::Accepted { count, sample } => {
                METRICS.readings_accepted.fetch_add(1, Ordering::Relaxed);
                println!("{}", report::progress_line(count, session.target(), &sample));

                if session.target_reached() {
                    let summary = finalize(transport, &mut session, cfg).await?;
                    return Ok(Outcome::Completed(summary));
                }
            }

            Step::Rejected(text) => {
                METRICS.messages_rejected.fetch_add(1, Ordering::Relaxed);
                println!("{}", report::skipped_line(&text));
                debug!("[{}] rejected payload: {:?}", transport.name(), text);
            }

            Step::ConnectionLost(code) => {
                METRICS.unexpected_disconnects.fetch_add(1, Ordering::Relaxed);
                warn!("Unexpected disconnection from MQTT broker (code {})", code);
            }

            Step::Fatal(code) => {
                bail!("Failed to connect to MQTT broker. Return code: {}", code);
            }
        }
    }
}

/// Interrupt path: finalize with what we have, or report nothing.
async fn interrupt<T>(
    transport: &mut T,
    session: &mut Session,
    cfg: &Config,
) -> anyhow::Result<Outcome>
where
    T: Transport + ?Sized,
{
    println!("\n\nCollection interrupted by user");

    if session.readings().is_empty() {
        println!("No data collected.");
        session.finalize();
        disconnect(transport).await;
        return Ok(Outcome::NoData);
    }

    println!("Saving {} collected values...", session.readings().len());
    let summary = finalize(transport, session, cfg).await?;
    Ok(Outcome::Interrupted(summary))
}

/// Writes the CSV, prints statistics, then disconnects.
async fn finalize<T>(
    transport: &mut T,
    session: &mut Session,
    cfg: &Config,
) -> anyhow::Result<Summary>
where
    T: Transport + ?Sized,
{
    let summary = session.finalize();

    report::write_csv(&cfg.output, session.readings())?;
    print!("{}", report::render_summary(&cfg.output, &summary));
    debug!("{}", METRICS.line());

    disconnect(transport).await;
    Ok(summary)
}

/// The data is already on disk, so a failed disconnect is only logged.
async fn disconnect<T>(transport: &mut T)
where
    T: Transport + ?Sized,
{
    if let Err(e) = transport.disconnect().await {
        warn!("[{}] disconnect failed: {:#}", transport.name(), e);
    }
}

fn print_start_banner(cfg: &Config) {
    println!("Connected to MQTT broker at {}", cfg.broker.host);
    println!("Subscribing to topic: {}", cfg.topic);
    println!("Started collecting wind data at {}", util::now_banner());
    println!("Waiting for {} wind readings...", cfg.target_count);
    println!("Expected format: {}", EXPECTED_FORMAT);
    println!("(Invalid format messages will be skipped)");
}
