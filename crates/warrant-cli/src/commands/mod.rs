pub(crate) mod check;
pub(crate) mod config;
pub(crate) mod rules;
