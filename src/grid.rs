//! Prepare job directories and submit them to the grid

/// Job names and the directory layout of a job
pub mod job;

/// Render the job control script from a template and write it to disk
pub mod script;

/// Hand a job script to the grid scheduler (jsub)
pub mod jsub;

/// The whole submission, from input file to queued job
pub mod submit;
