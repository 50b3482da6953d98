pub mod db;
pub mod scan {
    pub mod entity;
    pub mod fallback;
    pub mod image_store;
    pub mod local_file;
    pub mod repository;
}
