//! Core domain types
//!
//! These types describe a build as the runner sees it: the shell commands it
//! executes, the lifecycle steps grouping them, the matrix entries a build is
//! repeated over and the results folded back up from each level.

pub mod command;
pub mod matrix;
pub mod result;
pub mod step;
