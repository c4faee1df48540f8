//! Runs an [`Arm`] on its own tokio task so callers (the command loop, the stress tool) can hand
//! it work over a channel and watch the joints move without holding the arm themselves.

use futures_signals::signal::Mutable;
use log::{debug, info, warn};
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::arm::Arm;
use crate::error::{ArmError, ArmResult};
use crate::joint::Pose;
use crate::motion::ConvergeReport;
use crate::sequencer::{PickReport, PickRequest};

type Reply<T> = oneshot::Sender<ArmResult<T>>;

#[derive(Debug)]
enum ArmRequest {
  Initialize(Reply<()>),
  MoveTo(Pose, Reply<ConvergeReport>),
  MoveHome(Reply<ConvergeReport>),
  PickAndSort(PickRequest, Reply<PickReport>),
  ClassifyZone(u8, Reply<u8>),
  Shutdown,
}

pub struct ArmTask {
  arm: Arm,
}

impl ArmTask {
  pub fn start(arm: Arm) -> ArmHandle {
    let (tx, rx) = mpsc::channel::<ArmRequest>(32);
    let joints = arm.subscribe();
    let join_handle = tokio::spawn(async move {
      let mut me = Self { arm };
      me.handle_requests(rx).await;
      me.arm
    });

    ArmHandle { tx, join_handle, joints }
  }

  async fn handle_requests(&mut self, mut rx: Receiver<ArmRequest>) {
    while let Some(request) = rx.recv().await {
      debug!("arm task: received [{request:?}]");
      let delivered = match request {
        ArmRequest::Initialize(reply) => reply.send(self.arm.initialize_arm().await).is_ok(),
        ArmRequest::MoveTo(pose, reply) => reply.send(self.arm.move_to(pose).await).is_ok(),
        ArmRequest::MoveHome(reply) => reply.send(self.arm.move_home().await).is_ok(),
        ArmRequest::PickAndSort(request, reply) => {
          let result = self.arm.pick_and_sort(request.approach, request.destination).await;
          reply.send(result).is_ok()
        }
        ArmRequest::ClassifyZone(shoulder, reply) => reply.send(self.arm.classify_zone(shoulder)).is_ok(),
        ArmRequest::Shutdown => {
          info!("arm task: received shutdown signal...");
          break;
        }
      };
      if !delivered {
        warn!("arm task: caller went away before the reply");
      }
    }
    debug!("arm task: shutting down");
  }
}

/// Cheap to share by reference; every method waits for the arm to finish the request.
pub struct ArmHandle {
  tx: Sender<ArmRequest>,
  join_handle: JoinHandle<Arm>,
  joints: Mutable<Pose>,
}

impl ArmHandle {
  pub async fn initialize(&self) -> ArmResult<()> {
    self.call(ArmRequest::Initialize).await
  }

  pub async fn move_to(&self, pose: Pose) -> ArmResult<ConvergeReport> {
    self.call(|reply| ArmRequest::MoveTo(pose, reply)).await
  }

  pub async fn move_home(&self) -> ArmResult<ConvergeReport> {
    self.call(ArmRequest::MoveHome).await
  }

  pub async fn pick_and_sort(&self, request: PickRequest) -> ArmResult<PickReport> {
    self.call(|reply| ArmRequest::PickAndSort(request, reply)).await
  }

  pub async fn classify_zone(&self, shoulder: u8) -> ArmResult<u8> {
    self.call(|reply| ArmRequest::ClassifyZone(shoulder, reply)).await
  }

  /// Latest joint angles, updated every tick while the arm moves.
  pub fn joints(&self) -> Mutable<Pose> {
    self.joints.clone()
  }

  /// Stop the task once queued requests are done and hand the arm back.
  pub async fn shutdown(self) -> ArmResult<Arm> {
    self.tx.send(ArmRequest::Shutdown).await.map_err(|_| ArmError::TaskGone)?;
    self.join_handle.await.map_err(|_| ArmError::TaskGone)
  }

  async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> ArmRequest) -> ArmResult<T> {
    let (reply_tx, reply_rx) = oneshot::channel();
    self.tx.send(make(reply_tx)).await.map_err(|_| ArmError::TaskGone)?;
    reply_rx.await.map_err(|_| ArmError::TaskGone)?
  }
}

#[cfg(test)]
mod tests {
  use crate::config::ArmConfig;
  use crate::destination::Destination;
  use crate::sequencer::ApproachPose;
  use crate::servo_hal_mock::ServoHalMock;

  use super::*;

  fn start_arm() -> (ArmHandle, ServoHalMock) {
    let mock = ServoHalMock::new();
    let arm = Arm::new(Box::new(mock.clone()), &ArmConfig::default()).unwrap();
    (ArmTask::start(arm), mock)
  }

  #[tokio::test(start_paused = true)]
  async fn test_shutdown_returns_the_arm() {
    let (handle, _mock) = start_arm();
    handle.initialize().await.unwrap();
    handle.move_to(Pose::new(10, 100, 35, 90, 90, 40)).await.unwrap();

    let arm = handle.shutdown().await.unwrap();

    assert_eq!(arm.joint_state().get(crate::joint::Joint::Base), 10);
  }

  #[tokio::test(start_paused = true)]
  async fn test_errors_travel_back_to_the_caller() {
    let (handle, mock) = start_arm();

    assert!(matches!(handle.move_home().await, Err(ArmError::NotInitialized)));
    assert!(mock.writes().is_empty());
    assert_eq!(handle.classify_zone(50).await.unwrap(), 32);
    handle.shutdown().await.unwrap();
  }

  #[tokio::test(start_paused = true)]
  async fn test_pick_through_handle_publishes_joints() {
    let (handle, _mock) = start_arm();
    let joints = handle.joints();
    handle.initialize().await.unwrap();

    let report = handle
      .pick_and_sort(PickRequest::new(ApproachPose::new(120, 60, 60), Destination::RightFar))
      .await
      .unwrap();

    assert_eq!(report.grasp_depth, 35);
    assert_eq!(joints.get(), Pose::new(0, 100, 35, 90, 90, 15));
    handle.shutdown().await.unwrap();
  }

  #[tokio::test(start_paused = true)]
  async fn test_calls_after_shutdown_fail() {
    let (handle, _mock) = start_arm();
    let tx = handle.tx.clone();
    handle.shutdown().await.unwrap();

    let (reply_tx, _reply_rx) = oneshot::channel();
    assert!(tx.send(ArmRequest::MoveHome(reply_tx)).await.is_err());
  }
}
