pub mod arith;
pub mod blocks;
pub mod concurrency;
pub mod diffuse;
pub mod docs_check;
pub mod integrate;
pub mod pagerank;
pub mod probability;
pub mod refine;
pub mod solve;
pub mod sqrt;

use std::error::Error;

use grains_core::errors::GrainsError;

/// Boxes a library error for the command runners.
pub(crate) fn boxed(err: GrainsError) -> Box<dyn Error> {
    Box::new(err)
}
