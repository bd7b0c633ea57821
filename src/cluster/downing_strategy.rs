use rustc_hash::FxHashSet;
#[cfg(test)] use mockall::automock;
use std::fmt::Debug;
use tracing::debug;

use crate::cluster::address::Address;
use crate::cluster::cluster_view::ClusterView;
use crate::cluster::member::Member;


/// A [DowningStrategy] decides which members should be forcibly removed ('downed') once the
///  set of unreachable members has been *stable* for a configured period.
///
/// ## Network partitions
///
/// Even if some nodes become unreachable from this node, they can still be running and doing
///  work - with this node being unreachable as far as they are concerned. In such a situation
///  both sides of the partition need to agree on (at most) one side that can continue, and
///  terminate the rest.
///
/// And they need to agree without communicating - they are unreachable to each other after all.
///  That is the purpose and the main constraint for [DowningStrategy] implementations: To make
///  consistent decisions from each side's local [ClusterView] without requiring coordination.
///
/// The only hard constraint on a strategy is that at most one side may decide to keep itself in
///  a given scenario: Both sides surviving would mean two separate clusters and could cause
///  inconsistencies. It is perfectly valid for *all* sides to down themselves, shutting down the
///  entire cluster if no side can prove it should continue on its own.
///
/// ## Contract
///
/// Implementations are pure functions over the view: deterministic, terminating, no I/O, no
///  side effects. Empty member / unreachable sets are valid inputs and must yield an empty
///  victim set rather than an error.
///
/// Strategies accepting a role filter restrict their whole calculation to members of that role,
///  enabling per-role split-brain handling in mixed-role clusters.
#[cfg_attr(test, automock)]
pub trait DowningStrategy: Debug + Send + Sync {
    fn victims(&self, view: &ClusterView) -> FxHashSet<Member>;
}


/// [NoopStrategy] never selects victims, disabling automatic downing.
#[derive(Debug)]
pub struct NoopStrategy {}
impl DowningStrategy for NoopStrategy {
    fn victims(&self, _view: &ClusterView) -> FxHashSet<Member> {
        FxHashSet::default()
    }
}


/// [StaticQuorumStrategy] downs the unreachable members if at least `quorum_size` members (of
///  the given role, if any) are available. Otherwise the local partition cannot prove it holds
///  the majority, and it downs itself, i.e. all members it knows of.
///
/// The quorum size defines the minimum number of mutually reachable members the cluster must
///  have to remain operational, so it should be configured to more than half the expected
///  cluster size - then at most one side of any partition can reach it.
#[derive(Debug)]
pub struct StaticQuorumStrategy {
    pub quorum_size: usize,
    pub role: Option<String>,
}
impl DowningStrategy for StaticQuorumStrategy {
    fn victims(&self, view: &ClusterView) -> FxHashSet<Member> {
        let role = self.role.as_deref();
        let available = view.available_members(role).len();

        debug!("{} members available, quorum size {}", available, self.quorum_size);

        if available < self.quorum_size {
            view.members_in_role(role)
        }
        else {
            view.unreachable_members(role)
        }
    }
}


/// [KeepOldestStrategy] keeps the partition containing the earliest-joined member (of the given
///  role, if any) and downs the rest: the side holding the oldest member downs its unreachable
///  members, every other side downs itself.
///
/// With `down_if_alone`, an oldest member that ends up as the only available member downs
///  *itself* instead of waiting - useful when the oldest node hosts critical singletons that
///  should rather migrate than run isolated.
#[derive(Debug)]
pub struct KeepOldestStrategy {
    pub role: Option<String>,
    pub down_if_alone: bool,
}
impl DowningStrategy for KeepOldestStrategy {
    fn victims(&self, view: &ClusterView) -> FxHashSet<Member> {
        let role = self.role.as_deref();
        let members = view.members_in_role(role);
        let available = view.available_members(role);

        let oldest = match view.oldest_member(role) {
            Some(oldest) => oldest.clone(),
            None => return FxHashSet::default(),
        };

        let have_oldest = available.contains(&oldest);
        let oldest_is_alone = (have_oldest && available.len() == 1)
            || (!have_oldest && available.len() == members.len() - 1);

        debug!("oldest member {:?}, held by this partition: {}, alone: {}", oldest, have_oldest, oldest_is_alone);

        if oldest_is_alone && self.down_if_alone {
            return [oldest].into_iter().collect();
        }

        if have_oldest {
            view.unreachable_members(role)
        }
        else {
            members
        }
    }
}


/// [KeepRefereeStrategy] downs the side that does not contain the configured referee member. If
/// the referee itself is unavailable, or fewer than `down_all_if_less_than_nodes` members are
/// available, all members are downed.
///
/// This is good if one node hosts some critical resource the system cannot run without. It can
/// never produce two separate clusters - but the referee is a single point of failure, by
/// construction.
#[derive(Debug)]
pub struct KeepRefereeStrategy {
    pub referee: Address,
    pub down_all_if_less_than_nodes: usize,
}
impl DowningStrategy for KeepRefereeStrategy {
    fn victims(&self, view: &ClusterView) -> FxHashSet<Member> {
        let have_referee = view.has_available_member(&self.referee);

        debug!("referee {:?} available: {}", self.referee, have_referee);

        if !have_referee || view.available_members(None).len() < self.down_all_if_less_than_nodes {
            view.members_in_role(None)
        }
        else {
            view.unreachable_members(None)
        }
    }
}


/// [KeepMajorityStrategy] keeps the majority side based on the last known membership
///  information: if more members (of the given role, if any) are available than unreachable,
///  the unreachable ones are downed, otherwise the local partition downs itself.
///
/// If both sides are of equal size, the side containing the oldest member is kept - both sides
///  see the same membership and the same oldest member, so they reach opposite conclusions
///  about who survives.
#[derive(Debug)]
pub struct KeepMajorityStrategy {
    pub role: Option<String>,
}
impl DowningStrategy for KeepMajorityStrategy {
    fn victims(&self, view: &ClusterView) -> FxHashSet<Member> {
        let role = self.role.as_deref();
        let available = view.available_members(role);
        let unreachable = view.unreachable_members(role);

        debug!("{} members available, {} unreachable", available.len(), unreachable.len());

        if available.len() < unreachable.len() {
            return view.members_in_role(role);
        }
        if available.len() > unreachable.len() {
            return unreachable;
        }

        match view.oldest_member(role) {
            Some(oldest) if available.contains(oldest) => unreachable,
            _ => view.members_in_role(role),
        }
    }
}
