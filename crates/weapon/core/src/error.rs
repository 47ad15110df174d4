//! Configuration codec errors.
//!
//! Reported per entry; decoding of the surrounding list continues without
//! the offending module.

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// `Name` did not resolve through the property kind table.
    #[error("unknown property kind '{0}'")]
    UnknownKind(String),

    #[error("property entry has no 'Name' field")]
    MissingName,

    #[error("property entry is not an object")]
    NotAnObject,

    #[error("property list is not an array")]
    NotAList,
}

/// Registration failures; the rejected module is dropped.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Every `u16` sync id is already assigned on this weapon.
    #[error("sync ids exhausted ({limit} participants already registered)")]
    SyncIdsExhausted { limit: usize },
}
