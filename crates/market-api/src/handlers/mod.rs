pub mod file_upload;
pub mod media_stream;
pub mod storage_admin;
