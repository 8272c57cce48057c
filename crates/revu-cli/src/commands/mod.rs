pub mod config;
pub mod dispatch;
pub mod reset;
pub mod results;
pub mod review;
pub mod schema;
pub mod shared;
pub mod status;
