/// Errors raised while resolving dimensions or constructing unit systems.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("dimension '{dimension}' is not defined in unit system {system}")]
    UnknownDimension { system: String, dimension: String },

    #[error("invalid dimension expression '{expression}': {reason}")]
    InvalidDimension { expression: String, reason: String },

    #[error("unknown unit system '{0}'")]
    UnknownSystem(String),

    #[error("dimension '{dimension}' is already defined in unit system {system}")]
    DuplicateDimension { system: String, dimension: String },
}
