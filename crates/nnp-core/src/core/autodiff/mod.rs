//! # Automatic Differentiation
//!
//! A reverse-mode differentiation tape and the [`Scalar`] abstraction that energy
//! functions are written against.
//!
//! The tape retains its graph after every backward pass, and [`Tape::gradient`] records the
//! backward pass itself. This gives the two capabilities the Hessian extractor needs:
//! forces obtained from an energy remain differentiable, and the same graph can be
//! differentiated once per force component.
//!
//! ```ignore
//! use nnp::core::autodiff::{Scalar, Tape};
//!
//! let tape = Tape::new();
//! let x = tape.variable(0.5);
//! let f = x * x * x;
//! let df = tape.gradient(f, &[x])[0];
//! let d2f = tape.gradient_values(df, &[x])[0]; // 6x = 3.0
//! ```

pub mod scalar;
pub mod tape;

pub use scalar::{Scalar, Vec3};
pub use tape::{Tape, Var};
