//! # Netblock
//!
//! IPv4 CIDR blocks as used by VPC and subnet declarations.
//!
//! ```
//! use netblock::Ipv4Block;
//!
//! let vpc: Ipv4Block = "10.0.0.0/16".parse().unwrap();
//! let subnet: Ipv4Block = "10.0.1.0/24".parse().unwrap();
//!
//! assert!(vpc.contains(&subnet));
//! assert!(subnet.ensure_within(&vpc).is_ok());
//! ```

pub mod block;
pub mod error;

pub use block::{Ipv4Block, ensure_disjoint};
pub use error::{Error, Result};
