pub mod allowlist;
pub mod control;
pub mod dcc;
pub mod domain;
pub mod error;
pub mod experiment;
pub mod files;
pub mod json;
pub mod pipeline;
pub mod row;
pub mod writer;
