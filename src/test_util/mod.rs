use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio::sync::RwLock;

use crate::cluster::address::{Address, UniqueAddress};
use crate::cluster::cluster_view::ClusterView;
use crate::cluster::member::{Member, MemberStatus};
use crate::cluster::stability_gate::DowningSink;


/// convenience macro for unit test code: `member!(1: Up@3 ["backend"])` creates an 'Up' member
///  for test address 1 with up-number 3 and role "backend" (the role list may be omitted)
#[macro_export]
macro_rules! member {
    ($n:literal : $status:ident @ $up:literal) => {
        $crate::member!($n: $status @ $up [])
    };
    ($n:literal : $status:ident @ $up:literal [$($role:literal),*]) => {
        $crate::test_util::test_member_from_number(
            $n,
            $up,
            $crate::cluster::member::MemberStatus::$status,
            &[$($role),*],
        )
    };
}

/// creates an [Address] based on a number, the same number generating the same address and
///  different numbers different addresses - with address ordering following the numbers
pub fn test_address_from_number(number: u16) -> Address {
    Address::new("test", "cluster", format!("node-{:05}", number), number)
}

pub fn test_member_from_number(number: u16, up_number: u32, status: MemberStatus, roles: &[&str]) -> Member {
    Member::new(
        UniqueAddress::new(test_address_from_number(number), number.into()),
        up_number,
        status,
        roles.iter().map(|r| r.to_string()).collect::<BTreeSet<_>>(),
    )
}

pub fn test_view(members: Vec<Member>, unreachable: Vec<Member>, leader: Option<u16>) -> ClusterView {
    ClusterView::new(members, unreachable, leader.map(test_address_from_number))
}


/// A [DowningSink] for unit tests that records the downed addresses instead of acting on them.
#[derive(Debug, Default)]
pub struct TrackingDowningSink {
    downed: RwLock<Vec<Address>>,
}
impl TrackingDowningSink {
    pub fn new() -> TrackingDowningSink {
        TrackingDowningSink {
            downed: Default::default(),
        }
    }

    pub async fn downed(&self) -> Vec<Address> {
        self.downed.read().await.clone()
    }
}
#[async_trait]
impl DowningSink for TrackingDowningSink {
    async fn down(&self, node: &Address) -> anyhow::Result<()> {
        self.downed.write().await.push(node.clone());
        Ok(())
    }
}
