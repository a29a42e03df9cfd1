//! Small deterministic helpers shared by the codecs.

pub mod bytes;
