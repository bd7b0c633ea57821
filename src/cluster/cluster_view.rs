use rustc_hash::{FxHashMap, FxHashSet};

use crate::cluster::address::Address;
use crate::cluster::cluster_events::ClusterEvent;
use crate::cluster::member::{Member, MemberStatus};


/// An immutable snapshot of cluster membership as far as the local membership protocol has
///  observed it: the known members (unique by address), the set of members currently considered
///  unreachable, the elected leader and the per-role leaders.
///
/// A view is never mutated in place: [ClusterView::apply] folds one membership event into a
///  snapshot, producing the next snapshot. The unreachable set is tracked independently of
///  `members` - a node can be reported unreachable before its 'Up' transition is observed, so
///  unreachable entries need not have a counterpart in `members`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterView {
    members: FxHashMap<Address, Member>,
    unreachable: FxHashMap<Address, Member>,
    leader: Option<Address>,
    role_leaders: FxHashMap<String, Address>,
}
impl ClusterView {
    pub fn new(
        members: impl IntoIterator<Item = Member>,
        unreachable: impl IntoIterator<Item = Member>,
        leader: Option<Address>,
    ) -> ClusterView {
        ClusterView {
            members: members.into_iter().map(|m| (m.address().clone(), m)).collect(),
            unreachable: unreachable.into_iter().map(|m| (m.address().clone(), m)).collect(),
            leader,
            role_leaders: Default::default(),
        }
    }

    pub fn leader(&self) -> Option<&Address> {
        self.leader.as_ref()
    }

    pub fn role_leader(&self, role: &str) -> Option<&Address> {
        self.role_leaders.get(role)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn unreachable(&self) -> impl Iterator<Item = &Member> {
        self.unreachable.values()
    }

    /// folds one membership event into this snapshot, producing the next snapshot. Total: events
    ///  that carry no membership information for the resolver leave the view unchanged, as does
    ///  e.g. removing a member that was never added.
    pub fn apply(&self, event: &ClusterEvent) -> ClusterView {
        use ClusterEvent::*;

        let mut next = self.clone();
        match event {
            CurrentClusterState(view) => next = view.clone(),
            LeaderChanged(leader) => next.leader = leader.clone(),
            RoleLeaderChanged { role, leader } => {
                match leader {
                    Some(addr) => {
                        next.role_leaders.insert(role.clone(), addr.clone());
                    }
                    None => {
                        next.role_leaders.remove(role);
                    }
                }
            }
            MemberUp(m) => {
                next.members.insert(m.address().clone(), m.clone());
            }
            MemberRemoved(m) => {
                next.members.remove(m.address());
            }
            UnreachableMember(m) => {
                next.unreachable.insert(m.address().clone(), m.clone());
            }
            ReachableMember(m) => {
                next.unreachable.remove(m.address());
            }
            MemberJoined(_) | MemberWeaklyUp(_) | MemberLeft(_) | MemberExited(_) => {}
        }
        next
    }

    /// the members this partition can actually count on: status 'Up', matching the role filter,
    ///  and not currently unreachable
    pub fn available_members(&self, role: Option<&str>) -> FxHashSet<Member> {
        self.members.values()
            .filter(|m| m.status == MemberStatus::Up)
            .filter(|m| matches_role(m, role))
            .filter(|m| !self.unreachable.contains_key(m.address()))
            .cloned()
            .collect()
    }

    /// the unreachable members matching the role filter. NB: status is deliberately not checked
    ///  here - a partition can contain not-yet-'Up' nodes that still must be accounted for when
    ///  sizing it, and a downing decision must be able to cover them.
    pub fn unreachable_members(&self, role: Option<&str>) -> FxHashSet<Member> {
        self.unreachable.values()
            .filter(|m| matches_role(m, role))
            .cloned()
            .collect()
    }

    /// all known members matching the role filter, regardless of status and reachability
    pub fn members_in_role(&self, role: Option<&str>) -> FxHashSet<Member> {
        self.members.values()
            .filter(|m| matches_role(m, role))
            .cloned()
            .collect()
    }

    pub fn has_available_member(&self, address: &Address) -> bool {
        match self.members.get(address) {
            Some(m) => m.status == MemberStatus::Up && !self.unreachable.contains_key(address),
            None => false,
        }
    }

    /// the member with the lowest up-number among the members matching the role filter, or
    ///  `None` if there are none. Age is a total order (see [Member::is_older_than]), so this
    ///  is deterministic.
    pub fn oldest_member(&self, role: Option<&str>) -> Option<&Member> {
        self.members.values()
            .filter(|m| matches_role(m, role))
            .fold(None, |oldest: Option<&Member>, m| match oldest {
                Some(o) if o.is_older_than(m) => Some(o),
                _ => Some(m),
            })
    }
}

fn matches_role(member: &Member, role: Option<&str>) -> bool {
    match role {
        Some(role) => member.has_role(role),
        None => true,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::member;
    use crate::test_util::{test_address_from_number, test_view};
    use rstest::rstest;
    use ClusterEvent::*;

    #[rstest]
    fn test_apply_leader_changed() {
        let view = test_view(vec![member!(1: Up@1), member!(2: Up@2)], vec![], None);

        let view = view.apply(&LeaderChanged(Some(test_address_from_number(1))));
        assert_eq!(view.leader(), Some(&test_address_from_number(1)));

        let view = view.apply(&LeaderChanged(None));
        assert_eq!(view.leader(), None);
    }

    #[rstest]
    fn test_apply_role_leader_changed() {
        let view = test_view(vec![], vec![], None);

        let view = view.apply(&RoleLeaderChanged { role: "backend".to_string(), leader: Some(test_address_from_number(2)) });
        assert_eq!(view.role_leader("backend"), Some(&test_address_from_number(2)));
        assert_eq!(view.role_leader("frontend"), None);

        let view = view.apply(&RoleLeaderChanged { role: "backend".to_string(), leader: None });
        assert_eq!(view.role_leader("backend"), None);
    }

    #[rstest]
    fn test_apply_member_up_and_removed() {
        let view = test_view(vec![member!(1: Up@1)], vec![], None);

        let view = view.apply(&MemberUp(member!(2: Up@2)));
        assert_eq!(view.members_in_role(None), [member!(1: Up@1), member!(2: Up@2)].into_iter().collect());

        // adding the same member again has no further effect
        let replayed = view.apply(&MemberUp(member!(2: Up@2)));
        assert_eq!(replayed, view);

        let view = view.apply(&MemberRemoved(member!(1: Up@1)));
        assert_eq!(view.members_in_role(None), [member!(2: Up@2)].into_iter().collect());

        // removing an already-removed member has no further effect
        let replayed = view.apply(&MemberRemoved(member!(1: Up@1)));
        assert_eq!(replayed, view);
    }

    #[rstest]
    fn test_apply_reachability() {
        let view = test_view(vec![member!(1: Up@1), member!(2: Up@2)], vec![], None);

        let view = view.apply(&UnreachableMember(member!(2: Up@2)));
        assert_eq!(view.unreachable_members(None), [member!(2: Up@2)].into_iter().collect());

        let replayed = view.apply(&UnreachableMember(member!(2: Up@2)));
        assert_eq!(replayed, view);

        let view = view.apply(&ReachableMember(member!(2: Up@2)));
        assert!(view.unreachable_members(None).is_empty());

        let replayed = view.apply(&ReachableMember(member!(2: Up@2)));
        assert_eq!(replayed, view);
    }

    #[rstest]
    fn test_apply_unreachable_before_member_up() {
        // a node can be reported unreachable before its 'Up' transition is observed
        let view = test_view(vec![member!(1: Up@1)], vec![], None)
            .apply(&UnreachableMember(member!(2: Joining@2)));

        assert_eq!(view.unreachable_members(None), [member!(2: Joining@2)].into_iter().collect());
        assert!(view.members_in_role(None).contains(&member!(1: Up@1)));
        assert!(!view.members_in_role(None).contains(&member!(2: Joining@2)));
    }

    #[rstest]
    fn test_apply_snapshot_replaces_wholesale() {
        let view = test_view(vec![member!(1: Up@1), member!(2: Up@2)], vec![member!(2: Up@2)], Some(1));

        let replacement = test_view(vec![member!(3: Up@3)], vec![], Some(3));
        let view = view.apply(&CurrentClusterState(replacement.clone()));
        assert_eq!(view, replacement);
    }

    #[rstest]
    #[case::joined(MemberJoined(member!(9: Joining@9)))]
    #[case::weakly_up(MemberWeaklyUp(member!(9: WeaklyUp@9)))]
    #[case::left(MemberLeft(member!(1: Leaving@1)))]
    #[case::exited(MemberExited(member!(1: Exiting@1)))]
    fn test_apply_lifecycle_noops(#[case] event: ClusterEvent) {
        let view = test_view(vec![member!(1: Up@1), member!(2: Up@2)], vec![member!(2: Up@2)], Some(1));
        assert_eq!(view.apply(&event), view);
    }

    #[rstest]
    fn test_available_members() {
        let view = test_view(
            vec![
                member!(1: Up@1 ["backend"]),
                member!(2: Up@2 ["backend"]),
                member!(3: Up@3 ["frontend"]),
                member!(4: Joining@4 ["backend"]),
                member!(5: Leaving@5 ["backend"]),
            ],
            vec![member!(2: Up@2 ["backend"])],
            None,
        );

        assert_eq!(
            view.available_members(None),
            [member!(1: Up@1 ["backend"]), member!(3: Up@3 ["frontend"])].into_iter().collect()
        );
        assert_eq!(
            view.available_members(Some("backend")),
            [member!(1: Up@1 ["backend"])].into_iter().collect()
        );
        assert!(view.available_members(Some("database")).is_empty());
    }

    #[rstest]
    fn test_unreachable_members_ignores_status() {
        let view = test_view(
            vec![member!(1: Up@1)],
            vec![member!(2: Joining@2 ["backend"]), member!(3: Up@3)],
            None,
        );

        assert_eq!(
            view.unreachable_members(None),
            [member!(2: Joining@2 ["backend"]), member!(3: Up@3)].into_iter().collect()
        );
        assert_eq!(
            view.unreachable_members(Some("backend")),
            [member!(2: Joining@2 ["backend"])].into_iter().collect()
        );
    }

    #[rstest]
    fn test_members_in_role_ignores_status() {
        let view = test_view(
            vec![member!(1: Up@1 ["backend"]), member!(2: Joining@2 ["backend"]), member!(3: Up@3)],
            vec![],
            None,
        );

        assert_eq!(view.members_in_role(None).len(), 3);
        assert_eq!(
            view.members_in_role(Some("backend")),
            [member!(1: Up@1 ["backend"]), member!(2: Joining@2 ["backend"])].into_iter().collect()
        );
    }

    #[rstest]
    fn test_has_available_member() {
        let view = test_view(
            vec![member!(1: Up@1), member!(2: Up@2), member!(3: Joining@3)],
            vec![member!(2: Up@2)],
            None,
        );

        assert!(view.has_available_member(&test_address_from_number(1)));
        assert!(!view.has_available_member(&test_address_from_number(2))); // unreachable
        assert!(!view.has_available_member(&test_address_from_number(3))); // not Up
        assert!(!view.has_available_member(&test_address_from_number(4))); // unknown
    }

    #[rstest]
    fn test_oldest_member() {
        let view = test_view(
            vec![member!(3: Up@3), member!(1: Up@7 ["backend"]), member!(2: Up@2 ["backend"])],
            vec![],
            None,
        );

        assert_eq!(view.oldest_member(None), Some(&member!(2: Up@2 ["backend"])));
        assert_eq!(view.oldest_member(Some("backend")), Some(&member!(2: Up@2 ["backend"])));
        assert_eq!(view.oldest_member(Some("database")), None);

        let empty = test_view(vec![], vec![], None);
        assert_eq!(empty.oldest_member(None), None);
    }

    #[rstest]
    #[case::no_role(None)]
    #[case::role(Some("backend"))]
    fn test_query_properties(#[case] role: Option<&str>) {
        let view = test_view(
            vec![
                member!(1: Up@1 ["backend"]),
                member!(2: Up@2 ["backend"]),
                member!(3: Joining@3 ["backend"]),
                member!(4: Up@4),
            ],
            vec![member!(2: Up@2 ["backend"]), member!(5: Joining@5 ["backend"])],
            None,
        );

        let available = view.available_members(role);
        let members = view.members_in_role(role);
        let unreachable = view.unreachable_members(role);

        assert!(available.is_subset(&members));
        assert!(available.is_disjoint(&unreachable));
    }
}
