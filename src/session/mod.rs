pub(crate) mod id_system;
