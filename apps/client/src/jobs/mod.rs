// Job records: normalization of upstream payloads, match tiers, offline dataset.

pub mod classifier;
pub mod fallback;
pub mod normalizer;
