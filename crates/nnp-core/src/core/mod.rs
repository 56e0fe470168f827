//! # Core Module
//!
//! Pure functions over coordinates, cells and matrices. None of them keep state between
//! calls.
//!
//! - **Differentiation** ([`autodiff`]) - Reverse-mode tape with higher-order gradients
//! - **Data** ([`models`]) - Frames and lattices
//! - **Energy Functions** ([`potential`]) - The `Potential` trait and reference potentials
//! - **Periodic Boundaries** ([`pbc`]) - Wrapping into the unit cell and repeat counts
//! - **Rotations** ([`so3`]) - Axis-angle rotations via the matrix exponential
//! - **Vibrations** ([`vib`]) - Hessians and mass-weighted normal modes

pub mod autodiff;
pub mod models;
pub mod pbc;
pub mod potential;
pub mod so3;
pub mod vib;
