use thiserror::Error;

/// Errors that can occur while reading serialized bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader ran out of bytes before the value was complete
    #[error("Unexpected end of buffer: needed {needed} byte(s) but only {remaining} remain")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A bool was encoded with a byte other than 0 or 1
    #[error("Invalid bool byte {byte}, expected 0 or 1")]
    InvalidBool { byte: u8 },

    /// A decoded value is outside the range its type allows
    #[error("Invalid value for {type_name}: {reason}")]
    InvalidValue {
        type_name: &'static str,
        reason: &'static str,
    },
}
