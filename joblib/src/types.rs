use std::path::PathBuf;
use std::sync::Arc;

pub type JobName = Arc<str>;
pub type Program = String;
pub type Args = Vec<String>;
pub type Dir = PathBuf;
pub type Envs = Vec<(String, String)>;
pub type RunId = uuid::Uuid;
pub type OutputLine = bytes::Bytes;
