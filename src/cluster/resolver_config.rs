use anyhow::{anyhow, bail, Context};
use std::sync::Arc;
use std::time::Duration;

use crate::cluster::address::Address;
use crate::cluster::downing_strategy::{
    DowningStrategy, KeepMajorityStrategy, KeepOldestStrategy, KeepRefereeStrategy, NoopStrategy,
    StaticQuorumStrategy,
};


/// The externally loaded configuration surface of the resolver. Actual config file parsing is
///  the embedding application's concern; this struct is the recognized set of options.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// quiet period that must elapse without membership changes before a downing decision may
    ///  fire
    pub stable_after: Duration,
    /// one of `static-quorum`, `keep-oldest`, `keep-referee`, `keep-majority`, `off`
    pub active_strategy: String,
    pub quorum_size: usize,
    pub role: Option<String>,
    pub down_if_alone: bool,
    /// textual address of the referee node, e.g. `akka.tcp://my-system@host1:2552`
    pub referee_address: Option<String>,
    pub down_all_if_less_than_nodes: usize,
}
impl Default for ResolverConfig {
    fn default() -> ResolverConfig {
        ResolverConfig {
            stable_after: Duration::from_secs(10),
            active_strategy: "off".to_string(),
            quorum_size: 0,
            role: None,
            down_if_alone: false,
            referee_address: None,
            down_all_if_less_than_nodes: 0,
        }
    }
}
impl ResolverConfig {
    /// Builds the configured [DowningStrategy]. An unsupported strategy name or a malformed
    ///  referee address is a fatal configuration error: the resolver must not start without a
    ///  valid strategy, and there is no way to recover from this at runtime.
    pub fn downing_strategy(&self) -> anyhow::Result<Arc<dyn DowningStrategy>> {
        match self.active_strategy.as_str() {
            "off" => Ok(Arc::new(NoopStrategy {})),
            "static-quorum" => Ok(Arc::new(StaticQuorumStrategy {
                quorum_size: self.quorum_size,
                role: self.role.clone(),
            })),
            "keep-oldest" => Ok(Arc::new(KeepOldestStrategy {
                role: self.role.clone(),
                down_if_alone: self.down_if_alone,
            })),
            "keep-referee" => {
                let referee = self.referee_address.as_deref()
                    .ok_or_else(|| anyhow!("strategy 'keep-referee' requires a referee address"))?;
                let referee = Address::parse(referee)
                    .context("malformed referee address")?;
                Ok(Arc::new(KeepRefereeStrategy {
                    referee,
                    down_all_if_less_than_nodes: self.down_all_if_less_than_nodes,
                }))
            }
            "keep-majority" => Ok(Arc::new(KeepMajorityStrategy {
                role: self.role.clone(),
            })),
            other => bail!("unsupported downing strategy {:?} - supported are 'static-quorum', 'keep-oldest', 'keep-referee', 'keep-majority' and 'off'", other),
        }
    }
}
