pub mod changeset;
pub mod cli;
pub mod error;
pub mod formatter;
pub mod lcov;
pub mod model;
pub mod report;
pub mod structure;
