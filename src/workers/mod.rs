//! Named background components with an explicit lifecycle: each worker is
//! spawned with a cancellation token and joined on shutdown. No fire-and-forget
//! tasks.

use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct WorkerHandle {
    name: &'static str,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawns a worker. The factory receives the token and must return a
    /// future that exits promptly once the token is cancelled.
    pub fn spawn<F, Fut>(name: &'static str, factory: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let future = factory(token.clone());
        tracing::info!(worker = name, "starting background worker");
        let handle = tokio::spawn(future);
        Self { name, token, handle }
    }

    pub async fn stop(self) {
        tracing::info!(worker = self.name, "stopping background worker");
        self.token.cancel();
        if let Err(err) = self.handle.await {
            tracing::warn!(worker = self.name, error = %err, "worker join failed");
        }
    }
}

/// Stops a set of workers in reverse order of acquisition.
pub async fn stop_all(workers: Vec<WorkerHandle>) {
    for worker in workers.into_iter().rev() {
        worker.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn worker_stops_on_cancellation() {
        let worker = WorkerHandle::spawn("test", |token| async move {
            token.cancelled().await;
        });
        worker.stop().await;
    }

    #[tokio::test]
    async fn stop_all_joins_every_worker() {
        let workers = vec![
            WorkerHandle::spawn("a", |token| async move { token.cancelled().await }),
            WorkerHandle::spawn("b", |token| async move { token.cancelled().await }),
        ];
        stop_all(workers).await;
    }
}
