pub mod fanout_service;
pub mod image_review_service;
pub mod proximity_service;
