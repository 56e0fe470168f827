//! # Workflows Module
//!
//! Entry points that run a [`Potential`](crate::core::potential::Potential) through the
//! core transforms.
//!
//! - **Calculator** ([`calculator`]) - Energy, forces and stress of one frame, with
//!   optional wrapping into the central cell
//! - **Vibrations** ([`vibrations`]) - Coordinates to Hessian to normal modes in one call

pub mod calculator;
pub mod error;
pub mod vibrations;
