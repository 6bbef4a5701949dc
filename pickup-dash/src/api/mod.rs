//! HTTP API handlers for pickup-dash

pub mod assign;
pub mod farmers;
pub mod health;
pub mod stats;
pub mod train;
pub mod ui;
pub mod upload;

pub use assign::assign;
pub use farmers::list_farmers;
pub use health::health_routes;
pub use stats::get_stats;
pub use train::train;
pub use ui::{serve_app_js, serve_index};
pub use upload::upload_csv;
