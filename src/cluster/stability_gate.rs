use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, error, info};

use crate::cluster::address::Address;
use crate::cluster::cluster_events::ClusterEvent;
use crate::cluster::cluster_view::ClusterView;
use crate::cluster::downing_strategy::DowningStrategy;


/// The port through which the resolver issues its downing commands. Implemented by the
///  membership collaborator, which owns the actual (network) removal of the node, including
///  any retries - a returned error is logged here but neither retried nor allowed to hold up
///  event processing.
#[async_trait]
pub trait DowningSink: Send + Sync {
    async fn down(&self, node: &Address) -> anyhow::Result<()>;
}


/// The [StabilityGate] debounces membership churn before it lets the [DowningStrategy] make
///  its irreversible decision: continuous changes (nodes joining, flapping reachability) must
///  not trigger downing; only genuine, sustained unreachability should.
///
/// It is a two-state machine fed by a single ordered event stream:
///  * *waiting for stability*: every incoming event is folded into the current [ClusterView]
///    and restarts the one-shot `stable_after` timer. The timer expiring means no event
///    arrived for a full quiet period.
///  * *stable*: reached when the timer expires. On entry, and only if the local address is the
///    view's leader, the strategy is evaluated once against the accumulated view and every
///    victim is handed to the [DowningSink]. Evaluating on the leader only avoids duplicate
///    or conflicting down commands across the surviving partition. The next event returns the
///    machine to *waiting for stability*.
///
/// The gate task is the sole owner of the view; there is no shared mutable state, and closing
///  the event channel (or aborting the task) stops it without any further decision firing.
pub struct StabilityGate {
    myself: Address,
    stable_after: Duration,
    strategy: Arc<dyn DowningStrategy>,
    sink: Arc<dyn DowningSink>,
}
impl StabilityGate {
    pub fn new(
        myself: Address,
        stable_after: Duration,
        strategy: Arc<dyn DowningStrategy>,
        sink: Arc<dyn DowningSink>,
    ) -> StabilityGate {
        StabilityGate {
            myself,
            stable_after,
            strategy,
            sink,
        }
    }

    /// consumes the membership event stream until the sender is dropped. The first
    ///  [ClusterEvent::CurrentClusterState] establishes the starting view; events arriving
    ///  before it cannot be interpreted and are skipped.
    pub async fn run(self, mut events: mpsc::Receiver<ClusterEvent>) {
        let mut view = loop {
            match events.recv().await {
                None => return,
                Some(ClusterEvent::CurrentClusterState(view)) => break view,
                Some(e) => debug!("skipping event {:?} before the initial membership snapshot", e),
            }
        };

        loop {
            debug!("waiting {:?} for cluster stability", self.stable_after);

            let timer = time::sleep(self.stable_after);
            tokio::pin!(timer);

            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        None => return,
                        Some(event) => {
                            view = view.apply(&event);
                            timer.as_mut().reset(Instant::now() + self.stable_after);
                        }
                    },
                    _ = timer.as_mut() => break,
                }
            }

            self.on_stable(&view).await;

            // any further event means the quiet period is over
            match events.recv().await {
                None => return,
                Some(event) => view = view.apply(&event),
            }
        }
    }

    async fn on_stable(&self, view: &ClusterView) {
        if view.leader() != Some(&self.myself) {
            debug!("cluster stable, but {} is not the leader ({:?}) - not evaluating the downing strategy",
                self.myself, view.leader());
            return;
        }

        info!("cluster stable for {:?}: deferring to downing strategy {:?} for a decision on leader {}",
            self.stable_after, self.strategy, self.myself);

        for victim in self.strategy.victims(view) {
            info!("downing victim {:?}", victim);
            if let Err(e) = self.sink.down(victim.address()).await {
                error!("downing {:?} failed: {:#}", victim, e);
            }
        }
    }
}
