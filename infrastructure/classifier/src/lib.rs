pub mod client;
pub mod image_classifier;
pub mod model_handle;
pub mod preprocess;
