//! Wind payload parser
//!
//! Accepts the sensor's plain-text format:
//!
//! ```text
//! {speed:5.50,direction:126}
//! ```
//!
//! Keys may appear in any order and whitespace around `:` and `,`
//! is tolerated. Segments without a `:` are ignored; a later
//! duplicate key wins.

use crate::schema::WindSample;

const SPEED_KEY: &str = "speed";
const DIRECTION_KEY: &str = "direction";

/// Parses one raw payload into a `WindSample`.
///
/// RETURNS:
/// - `Some(sample)` when both `speed` and `direction` are present
///   and both values parse as floats (`inf` and `nan` included)
/// - `None` for anything else
///
/// IMPORTANT:
/// - This function must NEVER panic
/// - A value that fails to parse rejects the whole payload, even
///   if the same key appears again later with a valid value
///
pub fn parse_wind_payload(raw: &str) -> Option<WindSample> {
    let cleaned = raw.trim().trim_matches(|c| c == '{' || c == '}');

    let mut speed = None;
    let mut direction = None;

    for part in cleaned.split(',') {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };

        match key.trim() {
            SPEED_KEY => speed = Some(parse_number(value)?),
            DIRECTION_KEY => direction = Some(parse_number(value)?),
            _ => {}
        }
    }

    Some(WindSample {
        speed: speed?,
        direction: direction?,
    })
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(speed: f64, direction: f64) -> Option<WindSample> {
        Some(WindSample { speed, direction })
    }

    #[test]
    fn parses_canonical_payload() {
        assert_eq!(parse_wind_payload("{speed:5.50,direction:126}"), sample(5.5, 126.0));
    }

    #[test]
    fn key_order_does_not_matter() {
        assert_eq!(parse_wind_payload("{direction:90,speed:3.0}"), sample(3.0, 90.0));
    }

    #[test]
    fn tolerates_whitespace() {
        assert_eq!(
            parse_wind_payload("  { speed : 1.25 ,  direction :  270 }  "),
            sample(1.25, 270.0)
        );
        assert_eq!(parse_wind_payload("{speed:\t2,direction: 3\n}"), sample(2.0, 3.0));
    }

    #[test]
    fn accepts_negative_and_exponent_forms() {
        assert_eq!(parse_wind_payload("{speed:-1.5,direction:1e2}"), sample(-1.5, 100.0));
    }

    #[test]
    fn ignores_unknown_keys_and_bare_segments() {
        assert_eq!(
            parse_wind_payload("{id:7,speed:4,junk,direction:10}"),
            sample(4.0, 10.0)
        );
    }

    #[test]
    fn later_duplicate_key_wins() {
        assert_eq!(
            parse_wind_payload("{speed:1,speed:2,direction:3}"),
            sample(2.0, 3.0)
        );
    }

    #[test]
    fn braces_are_optional() {
        assert_eq!(parse_wind_payload("speed:1,direction:2"), sample(1.0, 2.0));
    }

    #[test]
    fn missing_keys_are_rejected() {
        assert_eq!(parse_wind_payload("{speed:5.50}"), None);
        assert_eq!(parse_wind_payload("{direction:126}"), None);
        assert_eq!(parse_wind_payload("{}"), None);
        assert_eq!(parse_wind_payload(""), None);
    }

    #[test]
    fn keys_are_case_sensitive() {
        assert_eq!(parse_wind_payload("{Speed:1,direction:2}"), None);
        assert_eq!(parse_wind_payload("{speed:1,DIRECTION:2}"), None);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert_eq!(parse_wind_payload("{speed:fast,direction:126}"), None);
        assert_eq!(parse_wind_payload("{speed:5.5,direction:}"), None);
        assert_eq!(parse_wind_payload("{speed:5.5,direction:N}"), None);
    }

    #[test]
    fn non_finite_floats_are_accepted() {
        assert_eq!(
            parse_wind_payload("{speed:inf,direction:1}"),
            sample(f64::INFINITY, 1.0)
        );
        assert_eq!(
            parse_wind_payload("{speed:2,direction:-infinity}"),
            sample(2.0, f64::NEG_INFINITY)
        );

        let nan = parse_wind_payload("{speed:nan,direction:3}").unwrap();
        assert!(nan.speed.is_nan());
        assert_eq!(nan.direction, 3.0);
    }

    #[test]
    fn malformed_structure_is_rejected() {
        assert_eq!(parse_wind_payload("bad-data"), None);
        assert_eq!(parse_wind_payload("{speed;5,direction;6}"), None);
        assert_eq!(parse_wind_payload("{speed:5 direction:6}"), None);
        assert_eq!(parse_wind_payload("{\"speed\":5,\"direction\":6}"), None);
    }

    #[test]
    fn invalid_value_rejects_even_if_key_repeats() {
        assert_eq!(parse_wind_payload("{speed:x,speed:1,direction:2}"), None);
    }
}
