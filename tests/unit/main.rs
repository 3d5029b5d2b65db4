//! Unit tests mirroring the source tree

mod analysis;
mod spatial;
