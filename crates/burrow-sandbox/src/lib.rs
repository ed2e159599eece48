//! Jailed path resolution.
//!
//! A [`Sandbox`] owns the confinement root and the current working
//! directory. Every user-supplied path goes through [`Sandbox::resolve`],
//! which normalizes it lexically and forces the result back inside the
//! root. Resolution never touches the filesystem; existence is the
//! caller's concern.

mod sandbox;

/// Jailed root + current working directory with clamping resolution.
pub use sandbox::Sandbox;
/// Lexical path normalization (`.` dropped, `..` popped, no filesystem access).
pub use sandbox::normalize;
