use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypesError {
    #[error("Invalid task configuration: {0}")]
    InvalidTaskConfig(String),

    #[error("Invalid proof data: {0}")]
    InvalidProof(String),

    #[error("Unknown contract network: {0}")]
    UnknownNetwork(String),
}

pub type Result<T> = std::result::Result<T, TypesError>;
