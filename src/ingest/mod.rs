//! Ingestion front-ends
//!
//! Front-ends turn inbound messages into write requests and hand them to a
//! [`PointsWriter`](crate::coordinator::PointsWriter), usually a
//! [`DataNode`](crate::coordinator::DataNode). Line formats are supplied by
//! the caller through [`LineParser`].

pub mod udp;

pub use udp::{LineParser, UdpServer};
