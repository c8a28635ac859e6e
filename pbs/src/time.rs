// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Time spans such as walltime and CPU time limits.

*/

use chrono::Duration;
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;

use scalar::{AttrType, CombineFailure, DecodeFailure};
use value::BatchOp;


/// A span of time in whole seconds, written `[-][[HH:]MM:]SS[.fff]`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimeSpan(i64);

impl TimeSpan {
    pub fn from_secs(secs: i64) -> TimeSpan {
        TimeSpan(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// The span as a `chrono` duration, if it is representable as one.
    pub fn as_duration(&self) -> Option<Duration> {
        Duration::try_seconds(self.0)
    }
}

fn field(raw: &str, text: &str) -> Result<i128, DecodeFailure> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeFailure::invalid(format!("\"{}\" is not of the form [-][[HH:]MM:]SS", raw)));
    }

    text.parse::<i128>()
        .map_err(|_| DecodeFailure::invalid(format!("time \"{}\" is too large", raw)))
}

impl AttrType for TimeSpan {
    /// A leading `-` marks a negative span; these arise from decrementing
    /// past zero, and are accepted back.
    fn decode_attr(_resource: Option<&str>, raw: &str) -> Result<TimeSpan, DecodeFailure> {
        let (negative, body) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let (clock, fraction) = match body.find('.') {
            Some(i) => (&body[..i], Some(&body[i + 1..])),
            None => (body, None),
        };

        let fields: Vec<&str> = clock.split(':').collect();

        if fields.len() > 3 {
            return Err(DecodeFailure::invalid(format!("too many fields in time \"{}\"", raw)));
        }

        let too_large = || DecodeFailure::invalid(format!("time \"{}\" is too large", raw));
        let mut secs: i128 = 0;

        for text in &fields {
            let n = field(raw, text)?;
            secs = secs.checked_mul(60).and_then(|s| s.checked_add(n)).ok_or_else(too_large)?;
        }

        // Fractional seconds round half up, away from zero, to a whole second.
        if let Some(frac) = fraction {
            field(raw, frac)?;

            if frac.as_bytes()[0] >= b'5' {
                secs += 1;
            }
        }

        if negative {
            secs = -secs;
        }

        i64::try_from(secs).map(TimeSpan).map_err(|_| too_large())
    }

    fn encode_attr(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }

        let total = self.0.unsigned_abs();
        write!(f, "{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
    }

    fn combine_attr(&mut self, source: &TimeSpan, op: BatchOp) -> Result<(), CombineFailure> {
        match op {
            BatchOp::Assign => self.0 = source.0,
            BatchOp::Increment => self.0 = self.0.wrapping_add(source.0),
            BatchOp::Decrement => self.0 = self.0.wrapping_sub(source.0),
            _ => return Err(CombineFailure::Unsupported),
        }
        Ok(())
    }

    fn compare_attr(&self, other: &TimeSpan) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.encode_attr(f)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: &str) -> i64 {
        TimeSpan::decode_attr(None, s).unwrap().as_secs()
    }

    #[test]
    fn field_forms() {
        assert_eq!(secs("45"), 45);
        assert_eq!(secs("10:00"), 600);
        assert_eq!(secs("01:30:00"), 5400);
        assert_eq!(secs("100:00:00"), 360_000);
        assert_eq!(secs("90"), 90);
    }

    #[test]
    fn negative_spans_survive_the_wire() {
        let mut t = TimeSpan::decode_attr(None, "10").unwrap();
        t.combine_attr(&TimeSpan::decode_attr(None, "1:00").unwrap(), BatchOp::Decrement).unwrap();
        assert_eq!(t.to_string(), "-00:00:50");
        assert_eq!(TimeSpan::decode_attr(None, &t.to_string()), Ok(t));

        let min = TimeSpan::from_secs(i64::min_value());
        assert_eq!(TimeSpan::decode_attr(None, &min.to_string()), Ok(min));
        assert_eq!(secs("-1:30"), -90);
    }

    #[test]
    fn fractions_round_half_up() {
        assert_eq!(secs("10.4"), 10);
        assert_eq!(secs("10.5"), 11);
        assert_eq!(secs("1:00.999"), 61);
    }

    #[test]
    fn reject_malformed() {
        for bad in &["1:2:3:4", "1::2", ":30", "10.", "ab", "--5", "-", "1.2.3", "99999999999999999999"] {
            assert!(TimeSpan::decode_attr(None, bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn canonical_text() {
        assert_eq!(TimeSpan::from_secs(5400).to_string(), "01:30:00");
        assert_eq!(TimeSpan::from_secs(360_005).to_string(), "100:00:05");
        assert_eq!(TimeSpan::from_secs(-61).to_string(), "-00:01:01");
    }

    #[test]
    fn chrono_view() {
        assert_eq!(TimeSpan::from_secs(90).as_duration(), Some(Duration::seconds(90)));
        assert_eq!(TimeSpan::from_secs(i64::max_value()).as_duration(), None);
    }
}
