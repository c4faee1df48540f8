use std::time::Duration;

use futures_signals::signal::Mutable;
use log::{debug, info};

use crate::calibration::Calibration;
use crate::config::ArmConfig;
use crate::destination::Destination;
use crate::error::{ArmError, ArmResult};
use crate::joint::{JointState, Pose};
use crate::motion::{ConvergeReport, MotionSynchronizer};
use crate::sequencer::{ApproachPose, PickPlaceSequencer, PickReport, PickRequest};
use crate::servo_hal::ServoHal;

/// The arm as callers see it: bring-up, raw moves, and the pick-and-sort routine.
pub struct Arm {
    motion: MotionSynchronizer,
    calibration: Calibration,
    alignment_delay: Duration,
    initialized: bool,
}

impl Arm {
    pub fn new(hal: Box<dyn ServoHal + Send>, config: &ArmConfig) -> ArmResult<Self> {
        config.calibration.validate()?;
        let motion = MotionSynchronizer::new(
            hal,
            config.calibration.seed_pose(),
            config.tick_interval(),
            config.max_ticks_per_move,
        )?;
        Ok(Self {
            motion,
            calibration: config.calibration.clone(),
            alignment_delay: config.alignment_delay(),
            initialized: false,
        })
    }

    pub async fn initialize_arm(&mut self) -> ArmResult<()> {
        info!("Bringing up servos...");
        self.motion.hal_mut().bring_up()?;
        self.motion.align(self.alignment_delay).await?;
        self.initialized = true;
        info!("Arm folded at [{}]", self.motion.joint_state().pose());
        Ok(())
    }

    pub async fn move_to(&mut self, pose: Pose) -> ArmResult<ConvergeReport> {
        self.ensure_initialized()?;
        debug!("move_to: [{pose}]");
        self.motion.converge(pose).await
    }

    pub async fn move_home(&mut self) -> ArmResult<ConvergeReport> {
        let home = self.calibration.home_pose();
        self.move_to(home).await
    }

    pub async fn pick_and_sort(
        &mut self,
        approach: ApproachPose,
        destination: Destination,
    ) -> ArmResult<PickReport> {
        self.ensure_initialized()?;
        let sequencer = PickPlaceSequencer::new(&self.calibration);
        let plan = sequencer.plan(PickRequest::new(approach, destination))?;
        sequencer.run(&mut self.motion, &plan).await
    }

    pub fn classify_zone(&self, shoulder: u8) -> ArmResult<u8> {
        self.calibration.zones.grasp_depth(shoulder)
    }

    pub fn joint_state(&self) -> &JointState {
        self.motion.joint_state()
    }

    pub fn subscribe(&self) -> Mutable<Pose> {
        self.motion.subscribe()
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn dump(&self) {
        debug!("Dumping all state:");
        debug!("initialized: {}", self.initialized);
        debug!("joint_state: [{}]", self.motion.joint_state().pose());

        debug!("Hal state:");
        if let Err(e) = self.motion.hal().dump() {
            debug!("<error: {e:?}>");
        }
    }

    fn ensure_initialized(&self) -> ArmResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(ArmError::NotInitialized)
        }
    }
}
