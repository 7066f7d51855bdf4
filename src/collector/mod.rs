/// Collector module
///
/// This module groups all logic responsible for:
/// - Tracking one collection run (session state machine)
/// - Driving a transport until the target count or an interrupt
/// - Triggering finalize (CSV + statistics)
///
/// The collector layer acts as the orchestration layer between:
/// - The transport (MQTT or a scripted test double)
/// - The report writer (output layer)
///
/// Design notes:
/// - Payload parsing lives in `parser`, not here
/// - `session` never performs I/O; `runner` performs all of it
pub mod runner;
pub mod session;
