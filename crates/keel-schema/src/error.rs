//! Error types for schema compilation.

use crate::grammar::Dialect;

/// Errors raised while compiling a blueprint.
///
/// Compilation is fail-fast: when any command fails, no statements are
/// returned for the blueprint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The dialect has no way to express the operation.
    #[error("{operation} is not supported by the {dialect} dialect")]
    UnsupportedOperation {
        /// Dialect that rejected the operation.
        dialect: Dialect,
        /// Command name, e.g. `dropColumn`.
        operation: &'static str,
    },

    /// More than one `primary` command was given for one table.
    #[error("table '{table}' declares more than one primary key ({dialect})")]
    DuplicatePrimaryKey {
        /// Dialect the blueprint was compiled for.
        dialect: Dialect,
        /// Table name.
        table: String,
    },

    /// An auto-increment column already carries the primary key, so an
    /// explicit `primary` command would declare a second one.
    #[error(
        "table '{table}' has auto-increment column '{column}', which is already the \
         primary key; remove the primary command ({dialect})"
    )]
    ConflictingPrimaryKey {
        /// Dialect the blueprint was compiled for.
        dialect: Dialect,
        /// Table name.
        table: String,
        /// The auto-increment column.
        column: String,
    },

    /// An enum column lists no allowed values.
    #[error("enum column '{column}' on table '{table}' must list at least one value")]
    EmptyEnum {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// A command that needs columns was given none.
    #[error("{operation} on table '{table}' requires at least one column")]
    EmptyColumns {
        /// Command name.
        operation: &'static str,
        /// Table name.
        table: String,
    },
}

/// Result type for schema compilation.
pub type Result<T> = std::result::Result<T, SchemaError>;
