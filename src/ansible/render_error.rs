#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    YamlSerializationError(#[from] serde_yaml::Error),

    #[error(transparent)]
    JsonSerializationError(#[from] serde_json::Error),
}
