/// Events delivered by a transport to the collector.
///
/// This is the whole vocabulary the session reacts to. Each
/// transport implementation maps its own client events onto it.
///
/// IMPORTANT:
/// - Events are delivered one at a time, in arrival order
/// - Transport-internal packets (acks, pings) never surface here
///
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection attempt finished. `0` means success, any other
    /// value is the broker's refusal code.
    Connected(u8),

    /// Payload received on a subscribed topic.
    Message { topic: String, payload: Vec<u8> },

    /// Connection dropped. `0` means a requested disconnect.
    Disconnected(u8),
}

/// Transport is the seam between:
/// - The collector runtime (session + runner)
/// - A concrete pub/sub client (MQTT in production)
///
/// Each implementation must:
/// - Start connecting as soon as it is constructed
/// - Report the connection result as `Connected(code)`
/// - Deliver inbound messages as `Message`
///
/// CANCELLATION:
/// - `next_event` is raced against the interrupt signal, so it
///   must be cancel safe: dropping the future must not lose an
///   event that was already dequeued
///
#[async_trait::async_trait]
pub trait Transport: Send {

    /// Short identifier used in log lines.
    fn name(&self) -> &'static str;

    /// Subscribes to `topic`. Only called after `Connected(0)`.
    async fn subscribe(&mut self, topic: &str) -> anyhow::Result<()>;

    /// Waits for the next event.
    ///
    /// RETURNS:
    /// - `Err` only for failures the transport cannot recover
    ///   from (e.g. the broker is unreachable before the first
    ///   successful connection)
    ///
    async fn next_event(&mut self) -> anyhow::Result<TransportEvent>;

    /// Requests a clean disconnect and flushes it to the broker.
    async fn disconnect(&mut self) -> anyhow::Result<()>;
}
