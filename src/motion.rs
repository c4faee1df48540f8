//! Motion synchronizer.
//!
//! Moves every joint from its last commanded angle toward a target [`Pose`] one degree per tick,
//! all joints within the same tick, writing each new angle out to the servos as it goes.  The
//! tick itself ([`MotionSynchronizer::step`]) never sleeps; [`MotionSynchronizer::converge`]
//! drives it and waits out the tick interval on the tokio clock, which tests pause.

use std::time::Duration;

use futures_signals::signal::Mutable;
use log::{debug, trace};
use tokio::time::sleep;

use crate::error::{ArmError, ArmResult};
use crate::joint::{Joint, JointState, Pose};
use crate::servo_hal::ServoHal;
use crate::signal::to_signal;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(15);

/// No valid target is more than 180 degrees away from any valid state.
pub const DEFAULT_MAX_TICKS: u32 = 180;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum StepOutcome {
    /// Nothing left to move; no signal was written.
    Converged,
    /// This many joints moved one degree.
    Moved(usize),
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct ConvergeReport {
    pub ticks: u32,
}

pub struct MotionSynchronizer {
    state: JointState,
    hal: Box<dyn ServoHal + Send>,
    tick_interval: Duration,
    max_ticks: u32,
    published: Mutable<Pose>,
}

impl MotionSynchronizer {
    pub fn new(
        hal: Box<dyn ServoHal + Send>,
        seed: Pose,
        tick_interval: Duration,
        max_ticks: u32,
    ) -> ArmResult<Self> {
        let state = JointState::seeded(seed)?;
        Ok(Self {
            state,
            hal,
            tick_interval,
            max_ticks,
            published: Mutable::new(seed),
        })
    }

    pub fn joint_state(&self) -> &JointState {
        &self.state
    }

    /// Read-only view of the joint state, updated after every tick.
    pub fn subscribe(&self) -> Mutable<Pose> {
        self.published.clone()
    }

    pub fn hal(&self) -> &(dyn ServoHal + Send) {
        &*self.hal
    }

    pub fn hal_mut(&mut self) -> &mut (dyn ServoHal + Send) {
        &mut *self.hal
    }

    /// Push the current state to every servo, one joint at a time with `settle` in between, so
    /// the actuators start out agreeing with the model.
    pub async fn align(&mut self, settle: Duration) -> ArmResult<()> {
        for joint in Joint::ALL {
            let angle = self.state.get(joint);
            debug!("align: {joint}={angle}");
            self.command(joint, angle)?;
            sleep(settle).await;
        }
        Ok(())
    }

    /// Advance one tick toward `target`.  `target` must already be validated.
    ///
    /// If a write fails partway through the tick, the joints already written keep their new
    /// angles, the failed one keeps its old angle, and subscribers see exactly that.
    pub fn step(&mut self, target: &Pose) -> ArmResult<StepOutcome> {
        let mut moved = 0;
        let mut result = Ok(());
        for joint in Joint::ALL {
            let current = self.state.get(joint);
            let wanted = target.get(joint);
            if current == wanted {
                continue;
            }
            let next = if current < wanted { current + 1 } else { current - 1 };
            if let Err(e) = self.command(joint, next) {
                result = Err(e);
                break;
            }
            moved += 1;
        }
        if moved > 0 {
            trace!("tick: [{}]", self.state.pose());
            self.published.set_neq(self.state.pose());
        }
        result?;
        if moved == 0 {
            return Ok(StepOutcome::Converged);
        }
        Ok(StepOutcome::Moved(moved))
    }

    /// The state only changes once the servo has accepted the new angle.
    fn command(&mut self, joint: Joint, angle: u8) -> ArmResult<()> {
        let drive_value = to_signal(angle)?;
        self.hal.write_signal(joint, drive_value)?;
        self.state.set(joint, angle);
        Ok(())
    }

    /// Returns once every joint matches `target`.  An already converged target returns
    /// immediately without writing anything.
    pub async fn converge(&mut self, target: Pose) -> ArmResult<ConvergeReport> {
        target.validate()?;
        let mut ticks = 0;
        while !self.state.matches(&target) {
            if ticks >= self.max_ticks {
                return Err(ArmError::UnreachableTarget { target, ticks });
            }
            self.step(&target)?;
            ticks += 1;
            sleep(self.tick_interval).await;
        }
        debug!("converged on [{target}] in {ticks} ticks");
        Ok(ConvergeReport { ticks })
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use crate::servo_hal::HalError;
    use crate::servo_hal_mock::{ServoHalMock, SignalWrite};

    use super::*;

    const FOLD: Pose = Pose::new(0, 100, 35, 90, 90, 40);

    fn synchronizer(max_ticks: u32) -> (MotionSynchronizer, ServoHalMock) {
        let mock = ServoHalMock::new();
        let motion = MotionSynchronizer::new(
            Box::new(mock.clone()),
            FOLD,
            DEFAULT_TICK_INTERVAL,
            max_ticks,
        )
        .unwrap();
        (motion, mock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_converge_lands_exactly_on_target() {
        let (mut motion, _mock) = synchronizer(DEFAULT_MAX_TICKS);
        let target = Pose::new(90, 40, 70, 90, 90, 15);

        let report = motion.converge(target).await.unwrap();

        assert_eq!(motion.joint_state().pose(), target);
        assert_eq!(report.ticks, 90);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_tick_interval_per_step() {
        let (mut motion, _mock) = synchronizer(DEFAULT_MAX_TICKS);
        let start = Instant::now();

        let report = motion.converge(FOLD.with(Joint::Elbow, 45)).await.unwrap();

        assert_eq!(report.ticks, 10);
        assert_eq!(start.elapsed(), DEFAULT_TICK_INTERVAL * 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_moving_joints_step_in_the_same_tick() {
        let (mut motion, mock) = synchronizer(DEFAULT_MAX_TICKS);
        let target = Pose::new(3, 98, 35, 90, 90, 41);

        assert_eq!(motion.step(&target).unwrap(), StepOutcome::Moved(3));
        assert_eq!(motion.joint_state().pose(), Pose::new(1, 99, 35, 90, 90, 41));
        assert_eq!(
            mock.writes(),
            vec![
                SignalWrite { joint: Joint::Base, drive_value: to_signal(1).unwrap() },
                SignalWrite { joint: Joint::Shoulder, drive_value: to_signal(99).unwrap() },
                SignalWrite { joint: Joint::Gripper, drive_value: to_signal(41).unwrap() },
            ]
        );

        // The gripper is held once it arrives while the others keep going.
        assert_eq!(motion.step(&target).unwrap(), StepOutcome::Moved(2));
        assert_eq!(motion.step(&target).unwrap(), StepOutcome::Moved(1));
        assert_eq!(motion.step(&target).unwrap(), StepOutcome::Converged);
        assert_eq!(mock.writes_for(Joint::Gripper).len(), 1);
        assert_eq!(mock.writes_for(Joint::Base).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_converge_to_current_pose_is_a_no_op() {
        let (mut motion, mock) = synchronizer(DEFAULT_MAX_TICKS);
        let start = Instant::now();

        let report = motion.converge(FOLD).await.unwrap();

        assert_eq!(report.ticks, 0);
        assert!(mock.writes().is_empty());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_target_writes_nothing() {
        let (mut motion, mock) = synchronizer(DEFAULT_MAX_TICKS);

        let result = motion.converge(FOLD.with(Joint::Base, 200)).await;

        assert!(matches!(
            result,
            Err(ArmError::OutOfRangeAngle { joint: Some(Joint::Base), angle: 200 })
        ));
        assert!(mock.writes().is_empty());
        assert_eq!(motion.joint_state().pose(), FOLD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_ceiling_surfaces_unreachable_target() {
        let (mut motion, _mock) = synchronizer(5);
        let target = FOLD.with(Joint::Base, 10);

        let result = motion.converge(target).await;

        assert!(matches!(result, Err(ArmError::UnreachableTarget { ticks: 5, .. })));
        // The model still reflects exactly what was sent to the servos.
        assert_eq!(motion.joint_state().get(Joint::Base), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_leaves_state_at_last_written_angles() {
        let (mut motion, mock) = synchronizer(DEFAULT_MAX_TICKS);
        let published = motion.subscribe();
        mock.fail_after(4);

        let result = motion.converge(Pose::new(10, 90, 35, 90, 90, 40)).await;

        assert!(matches!(result, Err(ArmError::Hal(HalError::InternalError(_)))));
        assert_eq!(
            mock.writes(),
            vec![
                SignalWrite { joint: Joint::Base, drive_value: to_signal(1).unwrap() },
                SignalWrite { joint: Joint::Shoulder, drive_value: to_signal(99).unwrap() },
                SignalWrite { joint: Joint::Base, drive_value: to_signal(2).unwrap() },
                SignalWrite { joint: Joint::Shoulder, drive_value: to_signal(98).unwrap() },
            ]
        );
        // Third tick: the base write is refused, so nothing moved.
        assert_eq!(motion.joint_state().pose(), Pose::new(2, 98, 35, 90, 90, 40));
        assert_eq!(published.get(), motion.joint_state().pose());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_midway_through_a_tick_publishes_the_joints_that_moved() {
        let (mut motion, mock) = synchronizer(DEFAULT_MAX_TICKS);
        let published = motion.subscribe();
        mock.fail_after(1);

        let result = motion.step(&Pose::new(10, 90, 35, 90, 90, 40));

        assert!(matches!(result, Err(ArmError::Hal(_))));
        assert_eq!(motion.joint_state().pose(), Pose::new(1, 100, 35, 90, 90, 40));
        assert_eq!(published.get(), motion.joint_state().pose());
        for joint in Joint::ALL {
            let written = mock.last_signal(joint);
            let expected = if joint == Joint::Base { Some(to_signal(1).unwrap()) } else { None };
            assert_eq!(written, expected, "{joint}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_align_writes_seed_pose_joint_by_joint() {
        let (mut motion, mock) = synchronizer(DEFAULT_MAX_TICKS);
        let start = Instant::now();

        motion.align(Duration::from_millis(200)).await.unwrap();

        let joints: Vec<_> = mock.writes().iter().map(|w| w.joint).collect();
        assert_eq!(joints, Joint::ALL.to_vec());
        assert_eq!(mock.last_signal(Joint::Shoulder), Some(to_signal(100).unwrap()));
        assert_eq!(start.elapsed(), Duration::from_millis(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_every_tick() {
        let (mut motion, _mock) = synchronizer(DEFAULT_MAX_TICKS);
        let published = motion.subscribe();

        motion.step(&FOLD.with(Joint::Base, 2)).unwrap();
        assert_eq!(published.get().base, 1);
        motion.converge(FOLD.with(Joint::Base, 2)).await.unwrap();
        assert_eq!(published.get().base, 2);
    }
}
