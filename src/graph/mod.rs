pub(crate) mod adapter;
pub(crate) mod eval;
pub(crate) mod memory;
pub(crate) mod snapshot;
