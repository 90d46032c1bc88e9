pub(crate) mod application;
