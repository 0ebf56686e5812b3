#![deny(missing_docs)]
#![doc = "Core grain arithmetic, capacity rules and determinism primitives shared by the grains crates."]

/// Ω-bounded fractions.
pub mod bounded;
/// Capacity expansion and rounding rules.
pub mod capacity;
/// Structured error types.
pub mod errors;
/// Fixed-capacity values.
pub mod fixed;
/// Exact rational grains.
pub mod grain;
/// Schema and provenance descriptors.
pub mod provenance;
/// Deterministic RNG handles.
pub mod rng;
/// Canonical serialization helpers.
pub mod serde;

pub use bounded::{BoundedGrain, DEFAULT_OMEGA};
pub use capacity::{expand_clamped, refine_capacity, rescale_round, round_div, CapacityStep};
pub use errors::{ErrorInfo, GrainsError};
pub use fixed::{FixedGrain, RefinePolicy};
pub use grain::Grain;
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use crate::serde::{from_json_slice, from_yaml_slice, stable_hash_string, to_canonical_json_bytes};
