use std::fmt;

#[derive(Debug)]
pub enum FlowError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad rule definition, bad override bound).
    ConfigValidation(String),
    /// A mapped input column is missing from the batch header.
    MissingColumn { column: String },
    /// Integer parse error (warehouse hops, stored flow code).
    IntParse { record: String, column: String, value: String },
    /// Boolean flag parse error.
    BoolParse { record: String, column: String, value: String },
    /// Unknown transport mode.
    ModeParse { record: String, value: String },
    /// IO error (CSV decode, serialization).
    Io(String),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { column } => {
                write!(f, "missing column '{column}' in input batch")
            }
            Self::IntParse { record, column, value } => {
                write!(
                    f,
                    "record '{record}': cannot parse '{column}' value '{value}' as integer"
                )
            }
            Self::BoolParse { record, column, value } => {
                write!(
                    f,
                    "record '{record}': cannot parse '{column}' value '{value}' as flag"
                )
            }
            Self::ModeParse { record, value } => {
                write!(f, "record '{record}': unknown transport mode '{value}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for FlowError {}
