pub mod batch;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod formula;
pub mod history;
pub mod locate;
pub mod logging;
pub mod numeric;
pub mod path_policy;
pub mod record;
pub mod repair;
pub mod report;
pub mod resize;
pub mod sheet;
pub mod summary;
