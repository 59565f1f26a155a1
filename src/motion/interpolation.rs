//! Constant-speed pose interpolation.
//!
//! A [`Session`] holds the per-joint speed planned for one transition and the instant the
//! last frame went out. It does no IO: the controller waits for the frame boundary, calls
//! [`Session::advance`] on its pose vectors and writes the result to the bus.
use core::fmt::{self, Display, Formatter};

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::config::MAX_ACTUATORS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationError {
    /// A pose slice does not have one entry per planned joint.
    LengthMismatch { expected: usize, actual: usize },
    TooManyJoints(usize),
}

impl Display for InterpolationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InterpolationError::LengthMismatch { expected, actual } => {
                write!(f, "pose has {actual} joints, session planned {expected}")
            }
            InterpolationError::TooManyJoints(count) => {
                write!(f, "{count} joints, at most {MAX_ACTUATORS} supported")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    speeds: Vec<u16, MAX_ACTUATORS>,
    last_frame: Instant,
}

/// Frames a transition of `duration_ms` is spread over. Always at least one.
pub fn frame_count(duration_ms: u32, frame_length: Duration) -> u32 {
    let frame_ms = frame_length.as_millis().max(1);
    let frames = u64::from(duration_ms) / frame_ms + 1;
    u32::try_from(frames).unwrap_or(u32::MAX)
}

/// Per-frame step that brings `current` to `target` within `frames` frames.
///
/// The `+ 1` rounds the truncated quotient up, so the joint moves at least one unit per
/// frame and `frames * speed` always exceeds the distance.
pub fn joint_speed(current: u16, target: u16, frames: u32) -> u16 {
    let distance = u32::from(current.abs_diff(target));
    u16::try_from(distance / frames.max(1) + 1).unwrap_or(u16::MAX)
}

impl Session {
    /// Plans a transition of every joint from `current` to `target` over `frames` frames.
    ///
    /// `current` and `target` must have the same length, at most `MAX_ACTUATORS`.
    pub fn plan(
        current: &[u16],
        target: &[u16],
        frames: u32,
        started: Instant,
    ) -> Result<Self, InterpolationError> {
        if current.len() != target.len() {
            return Err(InterpolationError::LengthMismatch {
                expected: current.len(),
                actual: target.len(),
            });
        }
        let mut speeds = Vec::new();
        for (&c, &t) in current.iter().zip(target) {
            speeds
                .push(joint_speed(c, t, frames))
                .map_err(|_| InterpolationError::TooManyJoints(current.len()))?;
        }
        Ok(Self {
            speeds,
            last_frame: started,
        })
    }

    pub fn speeds(&self) -> &[u16] {
        &self.speeds
    }

    pub fn last_frame(&self) -> Instant {
        self.last_frame
    }

    /// Earliest instant the next frame may go out.
    pub fn next_frame(&self, frame_length: Duration) -> Instant {
        self.last_frame + frame_length
    }

    pub fn mark_frame(&mut self, at: Instant) {
        self.last_frame = at;
    }

    /// Moves every joint one frame toward its target and reports whether all converged.
    ///
    /// A joint closer to its target than its speed snaps onto it, so no joint overshoots.
    /// Both slices must have one entry per planned joint.
    pub fn advance(
        &self,
        current: &mut [u16],
        target: &[u16],
    ) -> Result<bool, InterpolationError> {
        for len in [current.len(), target.len()] {
            if len != self.speeds.len() {
                return Err(InterpolationError::LengthMismatch {
                    expected: self.speeds.len(),
                    actual: len,
                });
            }
        }

        let mut complete = 0;
        for ((position, &goal), &speed) in current.iter_mut().zip(target).zip(&self.speeds) {
            let diff = i32::from(goal) - i32::from(*position);
            if diff == 0 {
                complete += 1;
            } else if diff.unsigned_abs() < u32::from(speed) {
                *position = goal;
                complete += 1;
            } else if diff > 0 {
                *position += speed;
            } else {
                *position -= speed;
            }
        }
        Ok(complete == self.speeds.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(33);

    #[test]
    fn frame_count_truncates_then_adds_one() {
        assert_eq!(frame_count(330, FRAME), 11);
        assert_eq!(frame_count(0, FRAME), 1);
        assert_eq!(frame_count(32, FRAME), 1);
        assert_eq!(frame_count(33, FRAME), 2);
        assert_eq!(frame_count(1000, FRAME), 31);
    }

    #[test]
    fn speed_keeps_both_round_ups() {
        assert_eq!(joint_speed(512, 612, 11), 10);
        assert_eq!(joint_speed(612, 512, 11), 10);
        assert_eq!(joint_speed(512, 512, 11), 1);
        assert_eq!(joint_speed(0, 1023, 1), 1024);
        assert_eq!(joint_speed(0, u16::MAX, 1), u16::MAX);
    }

    #[test]
    fn advance_snaps_instead_of_overshooting() {
        let target = [100, 0];
        let mut current = [0, 100];
        let session = Session::plan(&current, &target, 3, Instant::from_millis(0)).unwrap();
        assert_eq!(session.speeds(), &[34, 34]);

        assert!(!session.advance(&mut current, &target).unwrap());
        assert_eq!(current, [34, 66]);
        assert!(!session.advance(&mut current, &target).unwrap());
        assert_eq!(current, [68, 32]);
        assert!(session.advance(&mut current, &target).unwrap());
        assert_eq!(current, [100, 0]);
    }

    #[test]
    fn exact_multiple_needs_a_confirming_frame() {
        let target = [100];
        let mut current = [0];
        let session = Session::plan(&current, &target, 11, Instant::from_millis(0)).unwrap();
        assert_eq!(session.speeds(), &[10]);
        for _ in 0..10 {
            assert!(!session.advance(&mut current, &target).unwrap());
        }
        assert_eq!(current, [100]);
        assert!(session.advance(&mut current, &target).unwrap());
    }

    #[test]
    fn remainder_snaps_and_completes_in_one_frame() {
        let target = [20];
        let mut current = [0];
        let session = Session::plan(&current, &target, 2, Instant::from_millis(0)).unwrap();
        assert_eq!(session.speeds(), &[11]);
        assert!(!session.advance(&mut current, &target).unwrap());
        assert_eq!(current, [11]);
        assert!(session.advance(&mut current, &target).unwrap());
        assert_eq!(current, [20]);
    }

    #[test]
    fn next_frame_follows_last_frame() {
        let mut session = Session::plan(&[0], &[0], 1, Instant::from_millis(100)).unwrap();
        assert_eq!(session.next_frame(FRAME), Instant::from_millis(133));
        session.mark_frame(Instant::from_millis(140));
        assert_eq!(session.last_frame(), Instant::from_millis(140));
        assert_eq!(session.next_frame(FRAME), Instant::from_millis(173));
    }

    #[test]
    fn plan_rejects_mismatched_and_oversized_poses() {
        let start = Instant::from_millis(0);
        assert_eq!(
            Session::plan(&[0, 0, 0], &[5, 5], 2, start),
            Err(InterpolationError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            Session::plan(&[0; 40], &[10; 40], 2, start),
            Err(InterpolationError::TooManyJoints(40))
        );
        assert!(Session::plan(&[0; MAX_ACTUATORS], &[10; MAX_ACTUATORS], 2, start).is_ok());
    }

    #[test]
    fn advance_rejects_poses_of_another_length() {
        let session = Session::plan(&[0, 0, 0], &[5, 5, 5], 2, Instant::from_millis(0)).unwrap();
        let mut current = [0, 0];
        assert_eq!(
            session.advance(&mut current, &[5, 5]),
            Err(InterpolationError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(current, [0, 0]);

        let mut current = [0, 0, 0];
        assert_eq!(
            session.advance(&mut current, &[5, 5]),
            Err(InterpolationError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }
}
