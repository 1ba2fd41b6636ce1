//! Rigport Core - Foundational types for the Rigport importer
//!
//! This crate provides the core types that all other Rigport crates depend on:
//! - `PathHash` - CRC-32 bone path hashing
//! - `Transform`, `Vec3`, `Quat` - Spatial types and Unity-to-host swizzling
//! - `RigportConfig` - Layered import/physics settings
//! - Error types and Result alias

mod config;
mod error;
mod hash;
mod types;

pub use config::{ImportSettings, PhysicsSettings, RigportConfig};
pub use error::{Result, RigportError};
pub use hash::PathHash;
pub use types::{swizzle_position, swizzle_rotation, swizzle_scale, Transform};

pub use glam::{Mat4, Quat, Vec3};
