// Request lifecycles for the two remote operations. Both publish their state on a
// `watch` channel and let only the latest submission settle it.

pub mod analysis;
pub mod search;
pub mod token;
