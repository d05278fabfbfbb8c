pub(crate) mod chain;
pub(crate) mod color_mix;
pub(crate) mod core;
pub(crate) mod images;
pub(crate) mod normal_mix;
pub(crate) mod scratch;
