//! Progress reporting for workflow runs

pub mod reporter;
