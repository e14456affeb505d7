//! Register trace replay for the Voodoo pipeline: trace parsing, replay config and frame dumps

pub mod config;
pub mod output;
pub mod trace;
