pub(crate) mod accelerated;
pub(crate) mod config;
pub(crate) mod engine;
pub(crate) mod median;
pub(crate) mod selector;
pub(crate) mod state;
pub(crate) mod stats;
