//! Actuator id list validation.
use core::fmt::{self, Display, Formatter};

use heapless::Vec;

use crate::config::{MAX_ACTUATORS, MAX_ID};

pub type ActuatorIds = Vec<u8, MAX_ACTUATORS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorListError {
    Empty,
    TooMany(usize),
    /// Id 0 or an id reserved by the protocol (broadcast).
    InvalidId(u8),
    Duplicate(u8),
}

impl Display for ActuatorListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorListError::Empty => f.write_str("no actuators configured"),
            ActuatorListError::TooMany(count) => {
                write!(f, "{count} actuators, at most {MAX_ACTUATORS} supported")
            }
            ActuatorListError::InvalidId(id) => write!(f, "invalid actuator id {id}"),
            ActuatorListError::Duplicate(id) => write!(f, "actuator id {id} listed twice"),
        }
    }
}

/// Checks `ids` is a usable joint list: non-empty, ids in `1..=MAX_ID`, no repeats.
pub fn validate(ids: &[u8]) -> Result<ActuatorIds, ActuatorListError> {
    if ids.is_empty() {
        return Err(ActuatorListError::Empty);
    }
    if ids.len() > MAX_ACTUATORS {
        return Err(ActuatorListError::TooMany(ids.len()));
    }

    let mut valid = ActuatorIds::new();
    for &id in ids {
        if id == 0 || id > MAX_ID {
            return Err(ActuatorListError::InvalidId(id));
        }
        if valid.contains(&id) {
            return Err(ActuatorListError::Duplicate(id));
        }
        valid
            .push(id)
            .map_err(|_| ActuatorListError::TooMany(ids.len()))?;
    }
    Ok(valid)
}
