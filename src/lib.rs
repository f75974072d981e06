//! Per-plate core of a 2D plate-tectonics terrain generator.
//!
//! A [`Plate`] owns a rectangular crust buffer floating inside a toroidal
//! world and implements the geophysical operations a world driver runs
//! every simulation step: crust accretion, subduction, continental
//! aggregation, hydraulic erosion, continent bookkeeping, and on-demand
//! growth of the plate's bounds.
//!
//! The driver that owns the plate collection, initial plate seeding from
//! a world heightmap, rendering, and file I/O all live outside this
//! crate. Plates are single-writer objects: every operation assumes
//! exclusive access, and cross-plate operations borrow the peer mutably.

pub mod config;
pub mod grid;
pub mod plate;
pub mod world;

pub use config::PlateParams;
pub use grid::{AgeMap, Grid, HeightMap};
pub use plate::{
    Bounds, ContinentId, Mass, MassBuilder, Movement, Plate, PlateError, SegmentData, Segments,
    UNASSIGNED,
};
pub use world::WorldDimension;
