use anyhow::anyhow;
use std::fmt::{Debug, Display, Formatter};


/// The logical identity of a node's process: protocol and system name plus the host/port the
///  process is bound to. Pure value type with no behavior beyond equality - the total order
///  exists solely so that algorithms needing a deterministic tiebreak have one.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Address {
    pub protocol: String,
    pub system: String,
    pub host: String,
    pub port: u16,
}
impl Address {
    pub fn new(protocol: impl Into<String>, system: impl Into<String>, host: impl Into<String>, port: u16) -> Address {
        Address {
            protocol: protocol.into(),
            system: system.into(),
            host: host.into(),
            port,
        }
    }

    /// parses the textual form used in configuration, e.g. `akka.tcp://my-system@host1:2552`
    pub fn parse(s: &str) -> anyhow::Result<Address> {
        let (protocol, rest) = s.split_once("://")
            .ok_or_else(|| anyhow!("address {:?} is missing the '<protocol>://' prefix", s))?;
        let (system, authority) = rest.split_once('@')
            .ok_or_else(|| anyhow!("address {:?} is missing the '<system>@' part", s))?;
        let (host, port) = authority.rsplit_once(':')
            .ok_or_else(|| anyhow!("address {:?} is missing the port", s))?;
        let port: u16 = port.parse()
            .map_err(|_| anyhow!("address {:?} has a malformed port {:?}", s, port))?;

        if protocol.is_empty() || system.is_empty() || host.is_empty() {
            return Err(anyhow!("address {:?} has an empty protocol, system or host part", s));
        }

        Ok(Address::new(protocol, system, host, port))
    }
}
impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}@{}:{}", self.protocol, self.system, self.host, self.port)
    }
}
impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self)
    }
}


/// A node's lifecycle of cluster membership is monotonous, so a node can never rejoin once it
///  left (or was evicted). To allow rejoining from the same logical address, a uid is added for
///  disambiguation: the same [Address] with a different uid is a different incarnation.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct UniqueAddress {
    pub address: Address,
    pub uid: u64,
}
impl UniqueAddress {
    pub fn new(address: Address, uid: u64) -> UniqueAddress {
        UniqueAddress { address, uid }
    }
}
impl Debug for UniqueAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}@{}]", self.address, self.uid)
    }
}
