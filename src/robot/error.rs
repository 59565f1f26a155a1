use core::fmt::{self, Display, Formatter};

use super::actuators::ActuatorListError;
use crate::bus::sync_write::ProtocolError;
use crate::motion::interpolation::InterpolationError;

/// Error of a controller operation. `E` is the error type of the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus failed; the operation was aborted where it stood.
    Transport(E),
    /// A pose did not carry one position per actuator.
    Range { expected: usize, actual: usize },
    Protocol(ProtocolError),
    InvalidActuators(ActuatorListError),
    Interpolation(InterpolationError),
}

impl<E> From<ProtocolError> for Error<E> {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}

impl<E> From<InterpolationError> for Error<E> {
    fn from(err: InterpolationError) -> Self {
        Error::Interpolation(err)
    }
}

impl<E> From<ActuatorListError> for Error<E> {
    fn from(err: ActuatorListError) -> Self {
        Error::InvalidActuators(err)
    }
}

impl<E: fmt::Debug> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "bus transaction failed: {e:?}"),
            Error::Range { expected, actual } => {
                write!(f, "pose has {actual} positions, expected {expected}")
            }
            Error::Protocol(e) => write!(f, "sync write rejected: {e}"),
            Error::InvalidActuators(e) => write!(f, "{e}"),
            Error::Interpolation(e) => write!(f, "interpolation rejected: {e}"),
        }
    }
}
