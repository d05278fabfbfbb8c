pub(crate) mod assignment;
pub(crate) mod composer;
pub(crate) mod preset;
