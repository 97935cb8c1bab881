mod end_session;
mod root;
mod send;

pub use root::Cli;
