//! Database models split into domain-specific modules.

pub mod common;
pub mod reservation;
pub mod restriction;
pub mod room;

pub use common::*;
pub use reservation::*;
pub use restriction::*;
pub use room::*;
