//! Text commands from the vision side, one per line: `BBB,SSS,EEE,C` where the first three fields
//! are base, shoulder and elbow angles (usually zero padded) and `C` is the colour index of the
//! destination pile.

use std::str::FromStr;

use thiserror::Error;

use crate::destination::Destination;
use crate::joint::MAX_ANGLE;
use crate::sequencer::{ApproachPose, PickRequest};

#[derive(Error, PartialEq, Eq, Debug)]
pub enum CommandError {
    #[error("expected 4 comma separated fields, got {0}")]
    FieldCount(usize),
    #[error("{field}: {value:?} is not a number in 0..=255")]
    NotANumber { field: &'static str, value: String },
    #[error("{field}: {value} is outside 0..=180")]
    AngleOutOfRange { field: &'static str, value: u8 },
    #[error("unknown colour {0}")]
    UnknownColour(u8),
}

const FIELD_NAMES: [&str; 4] = ["base", "shoulder", "elbow", "colour"];

pub fn parse_pick_command(line: &str) -> Result<PickRequest, CommandError> {
    let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    if fields.len() != FIELD_NAMES.len() {
        return Err(CommandError::FieldCount(fields.len()));
    }

    let mut values = [0u8; 4];
    for ((value, raw), field) in values.iter_mut().zip(&fields).zip(FIELD_NAMES) {
        *value = raw.parse().map_err(|_| CommandError::NotANumber {
            field,
            value: raw.to_string(),
        })?;
    }
    let [base, shoulder, elbow, colour] = values;

    for (field, value) in FIELD_NAMES.into_iter().zip([base, shoulder, elbow]) {
        if value > MAX_ANGLE {
            return Err(CommandError::AngleOutOfRange { field, value });
        }
    }
    let destination = Destination::try_from(colour).map_err(|_| CommandError::UnknownColour(colour))?;

    Ok(PickRequest::new(ApproachPose::new(base, shoulder, elbow), destination))
}

impl FromStr for PickRequest {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pick_command(s)
    }
}
