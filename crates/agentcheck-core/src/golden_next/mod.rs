//! Golden store internals; `golden.rs` is the public facade.

pub(crate) mod integrity;
pub(crate) mod io;
pub(crate) mod keys;
pub(crate) mod read;
pub(crate) mod write;

#[cfg(test)]
mod tests;
