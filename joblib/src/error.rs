use std::{io, result};
use thiserror;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to write to the output stream")]
    Output(#[source] io::Error),
    #[error("the {0} task exited unexpectedly")]
    TaskPanicked(&'static str),
}

pub type Result<T> = result::Result<T, Error>;
