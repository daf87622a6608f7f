//! Platform-neutral geometry and the display collaborator, plus headless
//! collaborator implementations for simulation and tests.

pub mod geometry;
pub mod headless;
pub mod screen;
