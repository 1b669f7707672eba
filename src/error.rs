use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed match data")]
    Csv(#[from] csv::Error),
    #[error("failed to serialize output")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse experiment config")]
    Config(#[from] json5::Error),
    #[error(
        "{0} is not a valid model. Must be one of: double-elo, double-elo-surface, \
         double-modified-glicko, double-glicko2, modified-glicko, barnett, random"
    )]
    UnknownModel(String),
    #[error("{model} has no parameter named {param}")]
    UnknownParam { model: &'static str, param: String },
    #[error("{model} trains {expected} parameters, but {actual} were given")]
    ParamCount {
        model: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{0} has no trainable parameters")]
    NothingToTrain(&'static str),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
