//! Pose store and interpolation driver.
//!
//! A [`Controller`] exclusively owns the current and target pose of a fixed list of
//! actuators, the bus they hang off and the clock that paces frames. Interpolation runs
//! as a state machine: [`Controller::interpolate_setup`] arms a session, every
//! [`Controller::interpolate_step`] advances all joints by one frame and sends them in a
//! single SYNC_WRITE, and the session ends once every joint sits on its target.
use heapless::Vec;
use log::{debug, info, warn};

use super::actuators::{self, ActuatorIds};
use super::error::Error;
use crate::bus::codec::{self, encode_word, RegisterWidth};
use crate::bus::sync_write::SyncWriteFrame;
use crate::bus::{Bus, ServoStatus};
use crate::config::{ControllerConfig, GOAL_POSITION, MAX_ACTUATORS, TORQUE_ENABLE};
use crate::motion::clock::Clock;
use crate::motion::interpolation::{self, Session};

/// One position per joint, in the order of the actuator id list.
pub type Pose = Vec<u16, MAX_ACTUATORS>;

pub struct Controller<B, C> {
    bus: B,
    clock: C,
    config: ControllerConfig,
    ids: ActuatorIds,
    current: Pose,
    target: Pose,
    session: Option<Session>,
}

impl<B, C> Controller<B, C>
where
    B: Bus,
    C: Clock,
{
    /// Creates a controller for `ids`, every joint at the configured center position.
    pub fn new(
        bus: B,
        clock: C,
        ids: &[u8],
        config: ControllerConfig,
    ) -> Result<Self, Error<B::Error>> {
        let ids = actuators::validate(ids)?;
        let center: Pose = ids.iter().map(|_| config.center_position).collect();
        info!("[MOTION] controller ready for {} actuators", ids.len());

        Ok(Self {
            bus,
            clock,
            config,
            ids,
            current: center.clone(),
            target: center,
            session: None,
        })
    }

    pub fn ids(&self) -> &[u8] {
        &self.ids
    }

    pub fn current_pose(&self) -> &[u16] {
        &self.current
    }

    pub fn target_pose(&self) -> &[u16] {
        &self.target
    }

    /// Per-frame speeds of the active session.
    pub fn speeds(&self) -> Option<&[u16]> {
        self.session.as_ref().map(Session::speeds)
    }

    pub fn is_interpolating(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn release(self) -> (B, C) {
        (self.bus, self.clock)
    }

    fn check_len(&self, actual: usize) -> Result<(), Error<B::Error>> {
        if actual != self.ids.len() {
            return Err(Error::Range {
                expected: self.ids.len(),
                actual,
            });
        }
        Ok(())
    }

    /// Sets the target of every joint. On a length mismatch the old target is kept.
    pub fn load_target_pose(&mut self, values: &[u16]) -> Result<(), Error<B::Error>> {
        self.check_len(values.len())?;
        self.target.copy_from_slice(values);
        Ok(())
    }

    /// Reads the goal position of every actuator into the current pose.
    ///
    /// Pauses `read_delay` after each read so the half-duplex line can turn around. A bus
    /// error stops the read; joints read before it keep their new value.
    pub async fn read_current_pose(&mut self) -> Result<(), Error<B::Error>> {
        for joint in 0..self.ids.len() {
            let id = self.ids[joint];
            let position = self
                .read_register(id, GOAL_POSITION, RegisterWidth::Word)
                .await?;
            self.current[joint] = position;
            self.clock.delay(self.config.read_delay).await;
        }
        debug!("[MOTION] read pose {:?}", self.current.as_slice());
        Ok(())
    }

    /// Sends the current pose to every actuator in one SYNC_WRITE.
    pub async fn write_current_pose(&mut self) -> Result<(), Error<B::Error>> {
        let frame = SyncWriteFrame::goal_positions(&self.ids, &self.current)?;
        self.bus.sync_write(&frame).await.map_err(Error::Transport)
    }

    /// Commands one actuator straight away. Neither pose nor a running session is touched.
    pub async fn set_position(
        &mut self,
        id: u8,
        position: u16,
    ) -> Result<ServoStatus, Error<B::Error>> {
        self.write_register(id, GOAL_POSITION, &encode_word(position))
            .await
    }

    pub async fn set_torque(
        &mut self,
        id: u8,
        enable: bool,
    ) -> Result<ServoStatus, Error<B::Error>> {
        self.write_register(id, TORQUE_ENABLE, &[u8::from(enable)])
            .await
    }

    pub async fn read_register(
        &mut self,
        id: u8,
        address: u8,
        width: RegisterWidth,
    ) -> Result<u16, Error<B::Error>> {
        let mut buf = [0u8; 2];
        self.bus
            .read(id, address, &mut buf[..width.size()])
            .await
            .map_err(Error::Transport)?;
        Ok(codec::decode(width, buf))
    }

    pub async fn write_register(
        &mut self,
        id: u8,
        address: u8,
        data: &[u8],
    ) -> Result<ServoStatus, Error<B::Error>> {
        self.bus
            .write(id, address, data)
            .await
            .map_err(Error::Transport)
    }

    /// Plans a transition from the current to the target pose lasting about `duration_ms`.
    ///
    /// Replaces any session still running; it restarts from wherever the joints are now.
    /// Does no IO.
    pub fn interpolate_setup(&mut self, duration_ms: u32) -> Result<(), Error<B::Error>> {
        let frames = interpolation::frame_count(duration_ms, self.config.frame_length);
        let session = Session::plan(&self.current, &self.target, frames, self.clock.now())?;
        if self.session.is_some() {
            debug!("[MOTION] replacing running session");
        }
        debug!(
            "[MOTION] {duration_ms} ms over {frames} frames, speeds {:?}",
            session.speeds()
        );
        self.session = Some(session);
        Ok(())
    }

    /// Waits for the next frame boundary, moves every joint one frame and writes the pose.
    ///
    /// Returns whether the session is still running. Without a session it returns
    /// `Ok(false)` at once and writes nothing. A bus error ends the session and leaves the
    /// pose where this frame put it.
    pub async fn interpolate_step(&mut self) -> Result<bool, Error<B::Error>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };

        self.clock
            .wait_until(session.next_frame(self.config.frame_length))
            .await;
        session.mark_frame(self.clock.now());

        if session.advance(&mut self.current, &self.target)? {
            debug!("[MOTION] pose reached");
            self.session = None;
        }

        match self.write_current_pose().await {
            Ok(()) => Ok(self.session.is_some()),
            Err(e) => {
                warn!("[MOTION] frame write failed, session aborted: {e}");
                self.session = None;
                Err(e)
            }
        }
    }

    /// Loads `pose`, interpolates to it over `duration_ms` and returns the frames written.
    pub async fn move_to(
        &mut self,
        pose: &[u16],
        duration_ms: u32,
    ) -> Result<u32, Error<B::Error>> {
        self.load_target_pose(pose)?;
        self.interpolate_setup(duration_ms)?;

        let mut frames = 1;
        while self.interpolate_step().await? {
            frames += 1;
        }
        Ok(frames)
    }
}
