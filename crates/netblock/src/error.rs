//! Error types for the netblock crate

use crate::Ipv4Block;
use thiserror::Error;

/// Errors raised while parsing or relating address blocks
///
/// Every variant is an invalid-range condition: either the block text is
/// malformed, or two well-formed blocks violate a containment/overlap rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Block text has no `/prefix` part
    #[error("invalid range '{0}': expected <address>/<prefix>")]
    MissingPrefix(String),

    /// Address part is not a dotted IPv4 address
    #[error("invalid range '{input}': '{address}' is not an IPv4 address")]
    InvalidAddress { input: String, address: String },

    /// Prefix part is not a number in 0..=32
    #[error("invalid range '{input}': prefix '{prefix}' must be between 0 and 32")]
    InvalidPrefix { input: String, prefix: String },

    /// Address has bits set beyond the prefix
    #[error("invalid range '{input}': host bits set, did you mean {network}?")]
    HostBitsSet { input: String, network: Ipv4Block },

    /// A block exceeds the block it must live in
    #[error("invalid range: {child} is not contained in {parent}")]
    NotContained { child: Ipv4Block, parent: Ipv4Block },

    /// Two blocks that must be disjoint share addresses
    #[error("invalid range: {first} overlaps {second}")]
    Overlap { first: Ipv4Block, second: Ipv4Block },
}

/// Result type alias for netblock operations
pub type Result<T> = std::result::Result<T, Error>;
