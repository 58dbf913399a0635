use crate::types::{JobName, OutputLine};

#[derive(Debug)]
pub enum Message {
    /// One complete line, without its line ending, to be written as `[tag] data`.
    Line { tag: JobName, data: OutputLine },
}
