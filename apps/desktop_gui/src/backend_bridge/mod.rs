//! Queue and worker thread between the egui frame loop and the list controller.

pub mod commands;
pub mod runtime;
