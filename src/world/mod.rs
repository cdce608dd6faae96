//! Simulated world for driving races without a game engine.
//!
//! [`circuit`] turns distance along a loop into gate crossings; [`npc`]
//! supplies AI drivers that move around it.

pub mod circuit;
pub mod npc;

pub use circuit::{Circuit, Gate, GateCrossing, GateKind};
pub use npc::{NpcDriver, NpcManager, NpcSettings};
