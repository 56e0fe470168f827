//! # nnp
//!
//! Numerical utilities for molecular simulation on top of a differentiable energy.
//!
//! ## Layout
//!
//! - **[`core`]: The Foundation.** Stateless transforms: periodic-boundary wrapping
//!   ([`core::pbc`]), rotations from the SO(3) exponential map ([`core::so3`]), analytical
//!   Hessians and normal-mode analysis ([`core::vib`]), and the differentiation tape they
//!   are built on ([`core::autodiff`]).
//!
//! - **[`workflows`]: The Public API.** Ties a [`core::potential::Potential`] to the core
//!   transforms: energy, forces and stress of a periodic structure, and the full
//!   coordinates-to-normal-modes pipeline.

pub mod core;
pub mod workflows;
