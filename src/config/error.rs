#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid container id `{id}`: {reason}")]
    InvalidContainerID { id: String, reason: &'static str },
    #[error("invalid memory bandwidth schema `{schema}`: {reason}")]
    InvalidMemBwSchema { schema: String, reason: &'static str },
    #[error("`{field}` is set but empty")]
    EmptySchema { field: &'static str },
    #[error("config provided but Intel RDT is not supported")]
    NotEnabled,
}
pub type Result<T> = std::result::Result<T, Error>;
