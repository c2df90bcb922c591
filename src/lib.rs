//! isobonk: axis-aligned collision core for an isometric world
//! (persistent cell index, swept prediction, slide resolution)

pub mod aabb;
pub mod api;
pub mod debug;
pub mod error;
pub mod grid;
pub mod ledger;
pub mod narrowphase;
pub mod object;
pub mod resolver;
pub mod types;
pub mod world;

pub use crate::aabb::{Aabb, Face, Segment};
pub use crate::api::*;
pub use crate::debug::{DebugFrame, DebugRecorder};
pub use crate::error::{GeometryError, WorldError};
pub use crate::grid::CellIndex;
pub use crate::ledger::FrameLedger;
pub use crate::narrowphase::Narrowphase;
pub use crate::object::{Actor, Collidable, Collider, Moved, Tile};
pub use crate::resolver::MoveOutcome;
pub use crate::types::*;
pub use crate::world::{CollisionWorld, swept_region};
