//! The user-supplied unit of work.

use std::fmt;
use std::future::Future;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::lifecycle::outcome::TaskResult;
use crate::lifecycle::stop::StopCondition;

type BlockingBody = Box<dyn FnOnce(StopCondition) -> TaskResult + Send + 'static>;
type AsyncBody = Box<dyn FnOnce(StopCondition) -> BoxFuture<'static, TaskResult> + Send + 'static>;

/// The main task of a process run.
///
/// The variant decides the execution strategy: `Async` bodies are raced
/// against termination signals and cancelled at their next await point,
/// `Blocking` bodies run to completion on the blocking pool and can only
/// observe the [`StopCondition`] by polling it.
pub enum MainTask {
    Blocking(BlockingBody),
    Async(AsyncBody),
}

impl MainTask {
    /// A synchronous body. It cannot be interrupted once started.
    pub fn blocking<F>(body: F) -> Self
    where
        F: FnOnce(StopCondition) -> TaskResult + Send + 'static,
    {
        MainTask::Blocking(Box::new(body))
    }

    /// An asynchronous body that ignores the stop condition.
    pub fn future<Fut>(body: Fut) -> Self
    where
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        MainTask::Async(Box::new(move |_stop| body.boxed()))
    }

    /// An asynchronous body that receives the stop condition explicitly.
    pub fn with_stop<F, Fut>(body: F) -> Self
    where
        F: FnOnce(StopCondition) -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        MainTask::Async(Box::new(move |stop| body(stop).boxed()))
    }
}

impl fmt::Debug for MainTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainTask::Blocking(_) => f.write_str("MainTask::Blocking"),
            MainTask::Async(_) => f.write_str("MainTask::Async"),
        }
    }
}
