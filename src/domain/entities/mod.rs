pub mod dispatch;
pub mod emergency;
pub mod image_report;
pub mod location;
