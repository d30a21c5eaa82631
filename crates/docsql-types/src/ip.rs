//! IP address values
//!
//! Addresses are stored canonically as 128-bit values. An IPv4 address stays
//! distinguishable from its IPv4-mapped IPv6 form so it can render in dotted
//! notation, but the two are equivalent for ordering and equality.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};

use crate::error::{ExprError, ExprResult};

/// An IPv4 or IPv6 address value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpValue(IpAddr);

impl IpValue {
    /// Wrap an already-parsed address
    pub fn new(addr: IpAddr) -> Self {
        Self(addr)
    }

    /// Parse an address literal.
    ///
    /// Empty strings, prefix/mask notation and single-segment shorthand are
    /// rejected with a semantic check failure naming the offending string.
    pub fn parse(s: &str) -> ExprResult<Self> {
        if s.is_empty() {
            return Err(ExprError::semantic_check(
                "IP address string is empty, expected an IPv4 or IPv6 address",
            ));
        }
        s.parse::<IpAddr>().map(Self).map_err(|e| {
            ExprError::semantic_check(format!("failed to parse IP address `{s}`: {e}"))
        })
    }

    /// The wrapped address as parsed
    pub fn addr(&self) -> IpAddr {
        self.0
    }

    /// Canonical 128-bit form: IPv4 promotes to its IPv4-mapped IPv6 address
    pub fn canonical(&self) -> Ipv6Addr {
        match self.0 {
            IpAddr::V4(v4) => v4.to_ipv6_mapped(),
            IpAddr::V6(v6) => v6,
        }
    }
}

impl PartialEq for IpValue {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for IpValue {}

impl PartialOrd for IpValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IpValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().octets().cmp(&other.canonical().octets())
    }
}

impl std::hash::Hash for IpValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical().octets().hash(state);
    }
}

impl fmt::Display for IpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // std renders IPv4-mapped IPv6 addresses in ::ffff:a.b.c.d form
        write!(f, "{}", self.0)
    }
}
