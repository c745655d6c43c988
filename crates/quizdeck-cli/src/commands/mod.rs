pub mod history;
pub mod init;
pub mod play;
pub mod retake;
pub mod take;
pub mod validate;
