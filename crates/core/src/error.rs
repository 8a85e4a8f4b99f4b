#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("file store error: {0}")]
    Files(#[from] panel_files::FilesError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
