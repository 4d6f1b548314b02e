pub mod commit;
pub mod demo;
pub mod init;
