//! The pick-and-sort routine: a fixed script of poses handed to the motion synchronizer one after
//! another.  The whole script is built and checked up front so a bad request never moves the arm.

use derive_new::new;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::destination::Destination;
use crate::error::{ArmError, ArmResult};
use crate::joint::{check_angle, Joint, Pose};
use crate::motion::MotionSynchronizer;

/// Where the object sits, as base/shoulder/elbow angles worked out by the remote side.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, new)]
pub struct ApproachPose {
    pub base: u8,
    pub shoulder: u8,
    pub elbow: u8,
}

impl ApproachPose {
    pub fn validate(&self) -> ArmResult<()> {
        check_angle(Some(Joint::Base), self.base)?;
        check_angle(Some(Joint::Shoulder), self.shoulder)?;
        check_angle(Some(Joint::Elbow), self.elbow)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, new)]
pub struct PickRequest {
    pub approach: ApproachPose,
    pub destination: Destination,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum PickPhase {
    Approach,
    Descend,
    Grasp,
    Lift,
    FoldForTransit,
    RouteToBase,
    RouteToReach,
    Release,
    FoldReturn,
    Home,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, new)]
pub struct PlannedMove {
    pub phase: PickPhase,
    pub pose: Pose,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PickPlan {
    pub request: PickRequest,
    pub grasp_depth: u8,
    pub moves: Vec<PlannedMove>,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct PickReport {
    pub grasp_depth: u8,
    pub ticks: u32,
}

pub struct PickPlaceSequencer<'a> {
    calibration: &'a Calibration,
}

impl<'a> PickPlaceSequencer<'a> {
    pub fn new(calibration: &'a Calibration) -> Self {
        Self { calibration }
    }

    pub fn plan(&self, request: PickRequest) -> ArmResult<PickPlan> {
        request.approach.validate()?;
        let c = self.calibration;
        let ApproachPose { base, shoulder, elbow } = request.approach;
        let grasp_depth = c.zones.grasp_depth(shoulder)?;
        let spot = c.destinations.spot(request.destination);
        let fold = c.fold;
        let home = c.home_pose();

        let moves = vec![
            PlannedMove::new(
                PickPhase::Approach,
                Pose::new(base, shoulder, elbow, c.wrist_raised, c.wrist_rotation, c.gripper_open),
            ),
            PlannedMove::new(
                PickPhase::Descend,
                Pose::new(base, shoulder, elbow, grasp_depth, c.wrist_rotation, c.gripper_open),
            ),
            PlannedMove::new(
                PickPhase::Grasp,
                Pose::new(base, shoulder, elbow, grasp_depth, c.wrist_rotation, c.gripper_closed),
            ),
            PlannedMove::new(
                PickPhase::Lift,
                Pose::new(base, shoulder, elbow, c.wrist_raised, c.wrist_rotation, c.gripper_closed),
            ),
            PlannedMove::new(
                PickPhase::FoldForTransit,
                Pose::new(base, fold.shoulder, fold.elbow, c.wrist_raised, c.wrist_rotation, c.gripper_closed),
            ),
            PlannedMove::new(
                PickPhase::RouteToBase,
                Pose::new(spot.base, fold.shoulder, fold.elbow, c.wrist_raised, fold.wrist_rotation, c.gripper_closed),
            ),
            PlannedMove::new(
                PickPhase::RouteToReach,
                Pose::new(
                    spot.base,
                    spot.reach.shoulder,
                    spot.reach.elbow,
                    spot.reach.wrist,
                    c.wrist_rotation,
                    c.gripper_closed,
                ),
            ),
            PlannedMove::new(
                PickPhase::Release,
                Pose::new(
                    spot.base,
                    spot.release.shoulder,
                    spot.release.elbow,
                    spot.release.wrist,
                    c.wrist_rotation,
                    c.gripper_open,
                ),
            ),
            PlannedMove::new(
                PickPhase::FoldReturn,
                Pose::new(spot.base, fold.shoulder, fold.elbow, c.wrist_raised, fold.wrist_rotation, c.gripper_open),
            ),
            PlannedMove::new(PickPhase::Home, home),
        ];

        for planned in &moves {
            planned.pose.validate()?;
        }
        Ok(PickPlan { request, grasp_depth, moves })
    }

    /// Execute a plan move by move.  The first failing move aborts the rest.
    pub async fn run(&self, motion: &mut MotionSynchronizer, plan: &PickPlan) -> ArmResult<PickReport> {
        info!(
            "Picking at {:?}, grasp depth {}, sorting to {:?}",
            plan.request.approach, plan.grasp_depth, plan.request.destination
        );
        let mut ticks = 0;
        for planned in &plan.moves {
            debug!("{:?}: [{}]", planned.phase, planned.pose);
            let report = motion.converge(planned.pose).await.map_err(|e| ArmError::SequenceAborted {
                phase: planned.phase,
                source: Box::new(e),
            })?;
            ticks += report.ticks;
        }
        info!("Sorted to {:?} in {ticks} ticks", plan.request.destination);
        Ok(PickReport { grasp_depth: plan.grasp_depth, ticks })
    }
}
