//! Galton box (quincunx) simulation: a triangular pin lattice, a memoized
//! stochastic bean path, the histogram it builds, and a frame-stepped
//! animation controller that drives one bean at a time.

pub mod animation;
pub mod config;
pub mod distribution;
pub mod error;
pub mod lattice;
pub mod path;
pub mod scene;

pub use animation::{BeanFrame, Controller, Phase, Tick};
pub use config::{MachineConfig, Settings};
pub use distribution::{Distribution, Statistics};
pub use error::{ConfigError, Result};
pub use lattice::{Lattice, Pin};
pub use path::{Bean, BeanPath, DrawSource, RngDraws, ScriptedDraws};
