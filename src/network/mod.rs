//! Simulated packet network of VM instances.
//!
//! - [`packet`]: The `(destination, x, y)` packet
//! - [`nat`]: Idle/NAT monitor that restarts a quiet network
//! - [`fabric`]: Round-robin scheduler, packet routing and idle detection

pub mod fabric;
pub mod nat;
pub mod packet;
