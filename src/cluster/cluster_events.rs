use crate::cluster::address::Address;
use crate::cluster::cluster_view::ClusterView;
use crate::cluster::member::Member;


/// Events emitted by the membership protocol. The resolver core consumes them as an ordered
///  stream; it folds a subset of them into its [ClusterView] and treats the rest as no-ops
///  (they still reset the stability clock, see
///  [StabilityGate](crate::cluster::stability_gate::StabilityGate)).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClusterEvent {
    /// full membership snapshot; sent once to establish the starting view, and replacing the
    ///  view wholesale if it arrives mid-stream
    CurrentClusterState(ClusterView),
    LeaderChanged(Option<Address>),
    /// `leader == None` removes the role's entry
    RoleLeaderChanged { role: String, leader: Option<Address> },
    MemberUp(Member),
    MemberRemoved(Member),
    UnreachableMember(Member),
    ReachableMember(Member),
    MemberJoined(Member),
    MemberWeaklyUp(Member),
    MemberLeft(Member),
    MemberExited(Member),
}
