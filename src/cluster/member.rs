use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};

use crate::cluster::address::{Address, UniqueAddress};


/// A cluster member as reported by the membership protocol. Immutable: a status change produces
///  a new [Member] value rather than mutating an existing one.
///
/// Identity (equality / hashing) is the unique address only - two [Member] values for the same
///  incarnation compare equal even if they were observed with different statuses.
#[derive(Clone)]
pub struct Member {
    pub unique_address: UniqueAddress,
    /// monotonically increasing counter assigned when the member was created, totally ordering
    ///  members by age: lower value = older
    pub up_number: u32,
    pub status: MemberStatus,
    pub roles: BTreeSet<String>,
}
impl Member {
    pub fn new(unique_address: UniqueAddress, up_number: u32, status: MemberStatus, roles: BTreeSet<String>) -> Member {
        Member {
            unique_address,
            up_number,
            status,
            roles,
        }
    }

    pub fn address(&self) -> &Address {
        &self.unique_address.address
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// The up-number is assigned from a global monotonic counter, so ties cannot occur between
    ///  distinct members - the fallback to address ordering exists for robustness so that age
    ///  is a total order regardless.
    pub fn is_older_than(&self, other: &Member) -> bool {
        match self.up_number.cmp(&other.up_number) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.unique_address < other.unique_address,
        }
    }

    pub fn with_status(&self, status: MemberStatus) -> Member {
        Member {
            unique_address: self.unique_address.clone(),
            up_number: self.up_number,
            status,
            roles: self.roles.clone(),
        }
    }
}
impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.unique_address == other.unique_address
    }
}
impl Eq for Member {}
impl Hash for Member {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_address.hash(state);
    }
}
impl Debug for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Member({:?}, #{}, {:?}, {:?})", self.unique_address, self.up_number, self.status, self.roles)
    }
}


/// see https://doc.akka.io/docs/akka/current/typed/cluster-membership.html
#[repr(u8)]
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum MemberStatus {
    /// A node has registered its wish to join the cluster, but the leader has not yet
    ///  transitioned it to 'Up'
    Joining = 1,
    /// A joining node promoted to a limited form of membership while some other node is
    ///  unreachable, i.e. while regular promotion to 'Up' is blocked
    WeaklyUp = 2,
    /// The regular state for a node that is 'up and running', a full member of the cluster. Note
    ///  that reachability (or lack thereof) is orthogonal to states, so a node can be 'Up' but
    ///  (temporarily) unreachable.
    Up = 3,
    /// A node that started to leave the cluster gracefully; still a full member
    Leaving = 4,
    /// Transient state on the way out: the node is basically not part of the cluster anymore
    Exiting = 5,
    /// Assigned to nodes that are forcibly removed, e.g. by a downing decision. Irreversible.
    Down = 6,
    /// Tombstone state: the node ceases to exist for all intents and purposes
    Removed = 7,
}
