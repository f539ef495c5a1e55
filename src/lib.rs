//! Event-chain Monte Carlo sampling of two-dimensional hard disks.
//!
//! A single active disk moves along x or y through a periodic box; each contact
//! hands the motion to the struck disk. A cell list keeps the collision search
//! local, and the contact statistics give the pressure directly.

pub mod core;
pub mod engine;
pub mod error;
pub mod interface;
pub mod solvers;
