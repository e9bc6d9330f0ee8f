use thiserror::Error;

#[derive(Error, Debug)]
/// Serialization error
///
/// Every fallible operation in the crate surfaces one of these variants.
/// The engine never recovers partially: the first failing cell or row aborts
/// the whole serialize/deserialize call, and nothing is logged on the way out.
pub enum SerializationError {
    /// A ruleset or a mandatory rule inside it is missing. Fatal, raised at
    /// lookup time before any row is touched.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A cell's text does not parse as the declared field type.
    #[error("cannot parse {value:?} as {target}")]
    Format {
        /// The offending cell text.
        value: String,
        /// Name of the target Rust type.
        target: &'static str,
    },

    /// A numeric cell parsed but does not fit the target's range.
    #[error("value {value:?} is out of range for {target}")]
    Overflow {
        /// The offending cell text.
        value: String,
        /// Name of the target Rust type.
        target: &'static str,
    },

    /// An empty cell was given for a non-optional, non-string target.
    #[error("missing value for required field of type {0}")]
    RequiredValueMissing(&'static str),

    /// A data line carries fewer cells than the ruleset binds, or no data
    /// line remains after the header.
    #[error("row shape mismatch: {0}")]
    RowShape(String),

    /// Single-record parse was handed text with no lines at all.
    #[error("input contains no lines")]
    EmptyInput,
}
