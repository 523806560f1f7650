//! # Discform-Core
//!
//! Core types and utilities for disc-golf throw form analysis: the 17-keypoint
//! pose model, confidence-gated frames, 2D geometric primitives and the
//! analysis configuration.

pub mod config;
pub mod error;
pub mod geometry;
pub mod types;

pub use crate::config::*;
pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
