//! Replicated write coordination
//!
//! The coordinator is responsible for:
//! - Turning a consistency level into an acknowledgement policy
//! - Fanning each write out to the replica writers of a shard
//! - Deciding success, failure or timeout as early as possible
//! - Serving replica writes forwarded by other nodes

pub mod node;
pub mod policy;
pub mod remote;
pub mod replica;
pub mod replicator;
pub mod request;
pub mod writer;

pub use node::DataNode;
pub use policy::{ConsistencyPolicy, Verdict};
pub use remote::RemoteWriter;
pub use replica::ReplicaServer;
pub use replicator::{WriteCoordinator, DEFAULT_WRITE_TIMEOUT};
pub use request::WriteRequest;
pub use writer::{LocalWriter, PointsWriter};
