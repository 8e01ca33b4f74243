//! IPv4 block value type

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 address block: a network base address plus a prefix length.
///
/// Invariants:
/// - prefix is in `0..=32`
/// - no host bits are set in the base address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Block {
    base: u32,
    prefix: u8,
}

impl Ipv4Block {
    /// Build a block from its parts
    pub fn new(base: Ipv4Addr, prefix: u8) -> Result<Self> {
        let input = format!("{}/{}", base, prefix);
        if prefix > 32 {
            return Err(Error::InvalidPrefix {
                input,
                prefix: prefix.to_string(),
            });
        }

        let raw = u32::from(base);
        let network = raw & mask(prefix);
        if network != raw {
            return Err(Error::HostBitsSet {
                input,
                network: Self {
                    base: network,
                    prefix,
                },
            });
        }

        Ok(Self { base: raw, prefix })
    }

    /// Parse `a.b.c.d/n`
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let (addr, prefix) = input
            .split_once('/')
            .ok_or_else(|| Error::MissingPrefix(input.to_string()))?;

        let base = Ipv4Addr::from_str(addr).map_err(|_| Error::InvalidAddress {
            input: input.to_string(),
            address: addr.to_string(),
        })?;

        let prefix_len = prefix
            .parse::<u8>()
            .ok()
            .filter(|p| *p <= 32)
            .ok_or_else(|| Error::InvalidPrefix {
                input: input.to_string(),
                prefix: prefix.to_string(),
            })?;

        Self::new(base, prefix_len).map_err(|e| match e {
            Error::HostBitsSet { network, .. } => Error::HostBitsSet {
                input: input.to_string(),
                network,
            },
            other => other,
        })
    }

    /// Network base address
    pub fn base(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.base)
    }

    /// Prefix length
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Whether `other` lies fully within this block
    pub fn contains(&self, other: &Self) -> bool {
        other.prefix >= self.prefix && other.base & mask(self.prefix) == self.base
    }

    /// Whether the two blocks share at least one address
    pub fn overlaps(&self, other: &Self) -> bool {
        self.base <= other.last_raw() && other.base <= self.last_raw()
    }

    /// Fail with [`Error::NotContained`] unless this block lies within `parent`
    pub fn ensure_within(&self, parent: &Self) -> Result<()> {
        if parent.contains(self) {
            Ok(())
        } else {
            Err(Error::NotContained {
                child: *self,
                parent: *parent,
            })
        }
    }

    fn last_raw(&self) -> u32 {
        self.base | !mask(self.prefix)
    }
}

/// Fail with [`Error::Overlap`] on the first pair of overlapping blocks.
///
/// Pairs are checked in input order, so the reported pair is stable.
pub fn ensure_disjoint<'a>(blocks: impl IntoIterator<Item = &'a Ipv4Block>) -> Result<()> {
    let blocks: Vec<&Ipv4Block> = blocks.into_iter().collect();
    for (i, first) in blocks.iter().enumerate() {
        for second in &blocks[i + 1..] {
            if first.overlaps(second) {
                return Err(Error::Overlap {
                    first: **first,
                    second: **second,
                });
            }
        }
    }
    Ok(())
}

fn mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p)),
    }
}

impl fmt::Display for Ipv4Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base(), self.prefix)
    }
}

impl FromStr for Ipv4Block {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ipv4Block {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Ipv4Block> for String {
    fn from(block: Ipv4Block) -> Self {
        block.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(s: &str) -> Ipv4Block {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let b = block("10.0.0.0/16");
        assert_eq!(b.base(), Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(b.prefix(), 16);
        assert_eq!(b.to_string(), "10.0.0.0/16");
        assert_eq!(block(" 0.0.0.0/0 ").to_string(), "0.0.0.0/0");
    }

    #[test]
    fn test_subnet_containment() {
        let vpc = block("10.0.0.0/16");
        assert!(vpc.contains(&block("10.0.1.0/24")));
        assert!(!vpc.contains(&block("10.1.0.0/24")));
        assert!(vpc.contains(&vpc));
        // A wider block is never contained in a narrower one
        assert!(!block("10.0.1.0/24").contains(&vpc));
        assert!(block("0.0.0.0/0").contains(&vpc));
    }

    #[test]
    fn test_ensure_within() {
        let vpc = block("10.0.0.0/16");
        assert!(block("10.0.255.0/24").ensure_within(&vpc).is_ok());

        let err = block("10.1.0.0/24").ensure_within(&vpc).unwrap_err();
        assert_eq!(
            err,
            Error::NotContained {
                child: block("10.1.0.0/24"),
                parent: vpc,
            }
        );
        assert!(err.to_string().contains("10.1.0.0/24"));
    }

    #[test]
    fn test_overlaps() {
        let a = block("10.0.0.0/24");
        assert!(a.overlaps(&block("10.0.0.128/25")));
        assert!(block("10.0.0.0/16").overlaps(&a));
        assert!(!a.overlaps(&block("10.0.1.0/24")));
        assert!(block("0.0.0.0/0").overlaps(&block("255.255.255.255/32")));
    }

    #[test]
    fn test_malformed_blocks() {
        assert!(matches!(
            Ipv4Block::parse("10.0.0.0"),
            Err(Error::MissingPrefix(_))
        ));
        assert!(matches!(
            Ipv4Block::parse("10.0.0/16"),
            Err(Error::InvalidAddress { .. })
        ));
        assert!(matches!(
            Ipv4Block::parse("10.0.0.0/33"),
            Err(Error::InvalidPrefix { .. })
        ));
        assert!(matches!(
            Ipv4Block::parse("10.0.0.0/abc"),
            Err(Error::InvalidPrefix { .. })
        ));

        let err = Ipv4Block::parse("10.0.1.5/24").unwrap_err();
        match err {
            Error::HostBitsSet { input, network } => {
                assert_eq!(input, "10.0.1.5/24");
                assert_eq!(network, block("10.0.1.0/24"));
            }
            other => panic!("Expected HostBitsSet, got {other:?}"),
        }
    }

    #[test]
    fn test_ensure_disjoint_reports_first_pair() {
        let blocks = [
            block("10.0.1.0/24"),
            block("10.0.2.0/24"),
            block("10.0.2.128/25"),
            block("10.0.1.0/25"),
        ];
        let err = ensure_disjoint(&blocks).unwrap_err();
        assert_eq!(
            err,
            Error::Overlap {
                first: blocks[0],
                second: blocks[3],
            }
        );

        assert!(ensure_disjoint(&blocks[..2]).is_ok());
        assert!(ensure_disjoint(std::iter::empty()).is_ok());
    }

    #[test]
    fn test_serde_as_string() {
        let b = block("172.16.0.0/12");
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "\"172.16.0.0/12\"");
        let back: Ipv4Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
        assert!(serde_json::from_str::<Ipv4Block>("\"172.16.0.1/12\"").is_err());
    }
}
