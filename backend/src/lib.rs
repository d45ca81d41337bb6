//! Property crowdfunding marketplace backend.
//!
//! Layers follow a hexagonal split: [`domain`] holds entities, services and
//! ports; [`outbound`] implements the ports; [`inbound`] exposes them over
//! HTTP; [`server`] wires everything together.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
