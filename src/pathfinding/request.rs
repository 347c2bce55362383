//! Path requests and the handles that deliver their results.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread::{self, Thread};

use futures::channel::oneshot::{self, Canceled};
use futures::executor::block_on;
use futures::future::{FutureExt, Shared};
use futures::task::{waker_ref, ArcWake};
use uuid::Uuid;
use web_time::{Duration, Instant};

use super::job::{PathResult, TargetCategory};
use super::obstruction::ObstructionOracle;
use crate::error::{PathfinderError, Result};
use crate::voxels::{voxel_center, Position, VoxelIndex};

/// What to compute, as submitted to [`Pathfinder::create_path_with`](super::Pathfinder::create_path_with).
///
/// Anything left unset is filled in by the pathfinder: a fresh job id, the
/// default oracle, and a category picked from whether the goal is blocked.
#[derive(Clone)]
pub struct PathRequest {
    pub(crate) agent: VoxelIndex,
    pub(crate) goal: Position,
    pub(crate) oracle: Option<Arc<dyn ObstructionOracle>>,
    pub(crate) job_id: Option<String>,
    pub(crate) category: Option<TargetCategory>,
}

impl PathRequest {
    /// From the agent's voxel to the centre of block `target`.
    pub fn to_block(agent: VoxelIndex, target: VoxelIndex) -> Self {
        PathRequest::to_position(agent, voxel_center(target))
    }

    /// From the agent's voxel to an arbitrary world position.
    pub fn to_position(agent: VoxelIndex, goal: Position) -> Self {
        PathRequest {
            agent,
            goal,
            oracle: None,
            job_id: None,
            category: None,
        }
    }

    pub fn oracle(mut self, oracle: Arc<dyn ObstructionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Names the job. Requests sharing an id share one cached result.
    pub fn job_id(mut self, id: impl Into<String>) -> Self {
        self.job_id = Some(id.into());
        self
    }

    pub fn category(mut self, category: TargetCategory) -> Self {
        self.category = Some(category);
        self
    }
}

impl fmt::Debug for PathRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathRequest")
            .field("agent", &self.agent)
            .field("goal", &self.goal)
            .field("custom_oracle", &self.oracle.is_some())
            .field("job_id", &self.job_id)
            .field("category", &self.category)
            .finish()
    }
}

/// Sending half of a job's outcome, held by the task that computes it.
pub(crate) type OutcomeSender = oneshot::Sender<Result<Arc<PathResult>>>;

/// The eventual outcome of a submitted job.
///
/// Clones observe the same outcome. Waiting can be done by blocking
/// ([`wait`](Self::wait), [`wait_timeout`](Self::wait_timeout)), by polling
/// ([`try_result`](Self::try_result)), or by awaiting the handle.
///
/// A job dropped by the pool without running resolves to
/// [`PathfinderError::PoolShutDown`].
#[derive(Clone)]
pub struct PathHandle {
    job_id: String,
    outcome: Shared<oneshot::Receiver<Result<Arc<PathResult>>>>,
}

impl PathHandle {
    /// A handle and the sender that completes it.
    pub(crate) fn channel(job_id: String) -> (OutcomeSender, Self) {
        let (sender, receiver) = oneshot::channel();
        let handle = PathHandle {
            job_id,
            outcome: receiver.shared(),
        };
        (sender, handle)
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Blocks until the job finishes.
    pub fn wait(&self) -> Result<Arc<PathResult>> {
        settle(block_on(self.outcome.clone()))
    }

    /// Blocks for at most `timeout`. `None` if the job is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<Arc<PathResult>>> {
        let deadline = Instant::now() + timeout;
        let waker = Arc::new(ThreadWaker(thread::current()));
        let waker = waker_ref(&waker);
        let mut cx = Context::from_waker(&waker);
        let mut outcome = self.outcome.clone();
        loop {
            if let Poll::Ready(outcome) = outcome.poll_unpin(&mut cx) {
                return Some(settle(outcome));
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            thread::park_timeout(deadline - now);
        }
    }

    /// The outcome if the job has finished. Never blocks.
    pub fn try_result(&self) -> Option<Result<Arc<PathResult>>> {
        self.outcome.clone().now_or_never().map(settle)
    }

    pub fn is_ready(&self) -> bool {
        self.try_result().is_some()
    }
}

impl Future for PathHandle {
    type Output = Result<Arc<PathResult>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.outcome.poll_unpin(cx).map(settle)
    }
}

impl fmt::Debug for PathHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathHandle")
            .field("job_id", &self.job_id)
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Unparks the thread blocked in [`PathHandle::wait_timeout`].
struct ThreadWaker(Thread);

impl ArcWake for ThreadWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.unpark();
    }
}

/// A sender dropped unsent means the task never ran.
fn settle(
    outcome: std::result::Result<Result<Arc<PathResult>>, Canceled>,
) -> Result<Arc<PathResult>> {
    outcome.unwrap_or(Err(PathfinderError::PoolShutDown))
}

/// A random UUID v4 job id.
pub fn generate_job_id() -> String {
    Uuid::new_v4().to_string()
}
