pub mod config;
pub mod init;
pub mod rotate;
pub mod run;
pub mod window;
