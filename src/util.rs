// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Miscellaneous utility functions.

 */

use chrono::Duration;
use colorio::ColorIo;
use pbs::{CompareError, PbsError};
use std::cmp::Ordering;


/// Print the outcome of a verification with affective color.
pub fn colorize_verdict(cio: &mut ColorIo, verdict: &Result<(), PbsError>) {
    match *verdict {
        Ok(()) => {
            cprint!(cio, green, "ok");
        },

        Err(ref e) => {
            cprint!(cio, red, "rejected");
            cprint!(cio, pl, " ({}) {}", e.code(), e);
        },
    }
}


/// Print how two values compare, with affective color.
pub fn colorize_ordering(cio: &mut ColorIo, ordering: Result<Ordering, CompareError>) {
    match ordering {
        Ok(Ordering::Less) => {
            cprint!(cio, pl, "less than");
        },

        Ok(Ordering::Equal) => {
            cprint!(cio, hl, "equal to");
        },

        Ok(Ordering::Greater) => {
            cprint!(cio, pl, "greater than");
        },

        Err(e) => {
            cprint!(cio, yellow, "{}", e);
        },
    }
}


/// Express a duration in text, approximately.
pub fn dur_to_text(dur: &Duration) -> String {
    if dur.num_days() > 2 {
        format!("{} days", dur.num_days())
    } else if dur.num_hours() > 2 {
        format!("{} hours", dur.num_hours())
    } else if dur.num_minutes() > 2 {
        format!("{} minutes", dur.num_minutes())
    } else {
        format!("{} seconds", dur.num_seconds())
    }
}
