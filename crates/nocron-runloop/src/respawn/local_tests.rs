use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use nocron_protocols::{
    PauseSignalStore, StatsStore, TaskDefinition, TaskExecutor, TaskFault, TaskKind, TaskOutput,
    TaskSettings, TaskStore,
};
use nocron_store::MemoryInstanceStore;

const SUFFIX: &str = "relay01";
const SECRET: &str = "0123456789abcdef0123456789abcdef";

/// Counts executions and requests a pause on the configured one.
struct PausingExecutor {
    store: Arc<MemoryInstanceStore>,
    runs: AtomicUsize,
    pause_on: usize,
}

#[async_trait]
impl TaskExecutor for PausingExecutor {
    async fn execute(&self, _task: &TaskDefinition) -> Result<TaskOutput, TaskFault> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        if run == self.pause_on {
            self.store.raise_pause(SUFFIX).await.unwrap();
        }
        Ok(TaskOutput::new("ok"))
    }
}

#[tokio::test]
async fn test_respawn_queues_invocation() {
    let (respawner, mut receiver) = LocalRespawner::channel();

    let ack = respawner.respawn(SUFFIX, SECRET).await.unwrap();
    assert_eq!(ack, RespawnAck::Queued);
    assert_eq!(
        receiver.recv().await.unwrap(),
        Invocation {
            suffix: SUFFIX.to_string(),
            secret: SECRET.to_string(),
        }
    );

    drop(receiver);
    assert!(matches!(
        respawner.respawn(SUFFIX, SECRET).await,
        Err(RespawnError::RelayClosed)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_relay_chains_until_paused() {
    let store = Arc::new(MemoryInstanceStore::new());
    let task = TaskDefinition::new(
        SUFFIX,
        SECRET,
        TaskSettings::new(TaskKind::UrlFetch, "https://example.com/ping", 1, 1),
    );
    store.create_task(&task).await.unwrap();

    let executor = Arc::new(PausingExecutor {
        store: store.clone(),
        runs: AtomicUsize::new(0),
        pause_on: 3,
    });
    let (respawner, receiver) = LocalRespawner::channel();
    let scheduler = SchedulerLoop::new(store.clone(), executor.clone(), Arc::new(respawner));
    let relay = LocalRelay::spawn(scheduler.clone(), receiver);
    assert!(relay.is_running());

    // First invocation is external; the relay carries the chain from there.
    scheduler.invoke(SUFFIX, Some(SECRET)).await.unwrap();

    let mut stopped = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let logs = store.recent_logs(SUFFIX, 1).await.unwrap();
        if logs.first().is_some_and(|l| l.contains("Stopped gracefully")) {
            stopped = true;
            break;
        }
    }

    assert!(stopped, "chain never stopped");
    assert_eq!(executor.runs.load(Ordering::SeqCst), 3);
    assert_eq!(store.load_stats(SUFFIX).await.unwrap().total_loops, 3);
    assert!(store.is_paused(SUFFIX).await.unwrap());

    relay.shutdown();
}
