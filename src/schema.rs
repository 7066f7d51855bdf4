use serde::Serialize;

use crate::util;

// ------------------------------------------------------------
// Wind sample
// ------------------------------------------------------------
//
// The pair of values carried by one well-formed payload:
//
//     {speed:5.50,direction:126}
//
// Produced by the payload parser, consumed by the session
// when it builds a `Reading`.
//
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSample {
    /// Wind speed in whatever unit the sensor publishes
    pub speed: f64,

    /// Wind direction in degrees
    pub direction: f64,
}

// ------------------------------------------------------------
// Reading
// ------------------------------------------------------------
//
// One accepted record, exactly as written to the CSV file.
//
// IMPORTANT:
// - Field order and names define the CSV header:
//   timestamp,topic,wind_speed,wind_direction
// - Readings are never mutated after creation.
//
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Reading {
    /// Capture time, naive local ISO-8601
    pub timestamp: String,

    /// Topic the payload arrived on
    pub topic: String,

    pub wind_speed: f64,

    pub wind_direction: f64,
}

impl Reading {
    /// Builds a reading stamped with the current local time.
    pub fn capture(topic: &str, sample: WindSample) -> Self {
        Self::at(util::now_iso(), topic, sample)
    }

    pub fn at(timestamp: String, topic: &str, sample: WindSample) -> Self {
        Self {
            timestamp,
            topic: topic.to_string(),
            wind_speed: sample.speed,
            wind_direction: sample.direction,
        }
    }
}
