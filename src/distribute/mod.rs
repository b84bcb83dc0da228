//! Fan-out of validated content to a group of Portal nodes.

pub mod distributor;
pub mod node;
pub mod selector;
pub mod session;

pub use distributor::{Distributor, PushReport};
pub use node::{NodeHandle, PortalNode};
pub use selector::{Broadcast, ClosestNodes, TargetSelector};
pub use session::connect_nodes;
