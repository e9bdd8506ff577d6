pub mod env;
pub mod err;
pub mod init;
pub mod reqwest_helper;
