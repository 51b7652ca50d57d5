//! Infrastructure implementations of the core ports: the HTTP relay client
//! and the simulated hardware collaborators.

pub mod relay;
pub mod sim;
