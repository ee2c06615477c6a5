pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod util;
