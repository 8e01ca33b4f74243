//! # Declarative
//!
//! A framework for declarative resource graphs.
//!
//! This crate provides the core abstractions for declaring resources that
//! reference each other, resolving the order they must be applied in, and
//! comparing a desired graph with what was last applied.
//!
//! ## Core Concepts
//!
//! - **Node**: A declared resource with an identifier (`kind.name`) and attributes
//! - **Value**: An attribute value; references to other nodes are the graph's edges
//! - **Graph**: Nodes in declaration order, indexed by identifier
//! - **Order**: Creation order from a depth-first topological sort; destruction is its reverse
//! - **ExecutionPlan**: The order grouped into waves that can be applied in parallel
//! - **ResourceDiff**: Create / update / replace / delete against a [`Snapshot`]
//!
//! ## Example
//!
//! ```
//! use declarative::{Graph, Node, NodeId, Reference, Value, resolve};
//!
//! let vpc = Node::new(NodeId::new("vpc", "main"))
//!     .with_attribute("cidr_block", Value::String("10.0.0.0/16".into()));
//! let subnet = Node::new(NodeId::new("subnet", "public"))
//!     .with_attribute("vpc_id", Value::Reference(Reference::parse("vpc.main.id").unwrap()));
//!
//! let graph = Graph::new(vec![subnet, vpc]).unwrap();
//! let order = resolve(&graph).unwrap();
//!
//! assert_eq!(order.creation()[0], NodeId::new("vpc", "main"));
//! assert_eq!(order.destruction()[0], NodeId::new("subnet", "public"));
//! ```
//!
//! ## Policy Traits
//!
//! Resource-kind knowledge stays with the caller:
//!
//! - [`ReplacementClassifier`]: Decides which attribute changes force replacement
//!
//! Everything here is a pure function over the declared graph. Nothing in
//! this crate performs I/O.

pub mod diff;
pub mod error;
pub mod graph;
pub mod planner;
pub mod policy;
pub mod resolver;
pub mod snapshot;
pub mod types;

// Re-export main types at crate root
pub use diff::{Action, AttributeChange, DiffSummary, ResourceDiff, compute_diffs, group_by_type};
pub use error::{Error, Result};
pub use graph::Graph;
pub use planner::{Direction, ExecutionPlan, components};
pub use policy::{AlwaysReplace, NeverReplace, ReplacementClassifier};
pub use resolver::{Order, resolve};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot};
pub use types::{Node, NodeId, Reference, Value};
