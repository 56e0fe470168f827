//! Plain data carried between the numerical components.

pub mod frame;
