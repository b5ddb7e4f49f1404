use std::fmt;

#[derive(Debug)]
pub enum AnalyticsError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// View config validation error (inverted bounds, bad top_n, etc.).
    ConfigValidation(String),
    /// A record could not be decoded from the input file.
    DataParse { format: &'static str, record: usize, message: String },
    /// Unsupported input file extension.
    UnknownFormat(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::DataParse { format, record, message } => {
                write!(f, "{format} record {record}: {message}")
            }
            Self::UnknownFormat(ext) => {
                write!(f, "unsupported data format '{ext}' (expected .csv or .json)")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for AnalyticsError {}

impl From<std::io::Error> for AnalyticsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
