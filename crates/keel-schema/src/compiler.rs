//! Blueprint compilation.
//!
//! The compiler is a stateless translation from a [`Blueprint`] to an ordered
//! list of SQL statements. It validates the whole blueprint before emitting
//! anything, then compiles commands in the order they were supplied.

use tracing::debug;

use crate::blueprint::{Blueprint, ColumnType, Command};
use crate::error::{Result, SchemaError};
use crate::grammar::{Dialect, SchemaGrammar};

/// Compiles blueprints for one dialect.
pub struct SchemaCompiler {
    grammar: Box<dyn SchemaGrammar>,
}

impl std::fmt::Debug for SchemaCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCompiler")
            .field("dialect", &self.grammar.dialect())
            .finish()
    }
}

impl SchemaCompiler {
    /// Creates a compiler for a built-in dialect.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self::with_grammar(dialect.grammar())
    }

    /// Creates a compiler over a custom grammar.
    #[must_use]
    pub fn with_grammar(grammar: Box<dyn SchemaGrammar>) -> Self {
        Self { grammar }
    }

    /// Returns the target dialect.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.grammar.dialect()
    }

    /// Returns the grammar.
    #[must_use]
    pub fn grammar(&self) -> &dyn SchemaGrammar {
        self.grammar.as_ref()
    }

    /// Returns the dialect's parameterized table-existence probe.
    #[must_use]
    pub fn table_exists_sql(&self) -> String {
        self.grammar.compile_table_exists()
    }

    /// Compiles every command of the blueprint, in order.
    ///
    /// No statements are returned if any command fails.
    pub fn compile(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        self.validate(blueprint)?;

        let mut statements = Vec::new();
        for command in blueprint.commands() {
            statements.extend(self.compile_command(blueprint, command)?);
        }

        debug!(
            dialect = %self.dialect(),
            table = %blueprint.table(),
            statements = statements.len(),
            "Compiled blueprint"
        );
        Ok(statements)
    }

    /// Compiles a single command against the blueprint.
    pub fn compile_command(&self, blueprint: &Blueprint, command: &Command) -> Result<Vec<String>> {
        let g = self.grammar.as_ref();
        let statements = match command {
            Command::Create => vec![g.compile_create_table(blueprint)?],
            Command::Add => g.compile_add(blueprint)?,
            Command::Rename { to } => vec![g.compile_rename(blueprint, to)?],
            Command::DropTable => vec![g.compile_drop_table(blueprint)?],
            Command::DropTableIfExists => vec![g.compile_drop_table_if_exists(blueprint)?],
            Command::DropColumn { columns } => vec![g.compile_drop_column(blueprint, columns)?],
            Command::Unique(index) => vec![g.compile_unique(blueprint, index)?],
            Command::Index(index) => vec![g.compile_index(blueprint, index)?],
            Command::DropUnique { index } => vec![g.compile_drop_unique(blueprint, index)?],
            Command::DropIndex { index } => vec![g.compile_drop_index(blueprint, index)?],
            Command::Foreign(foreign) => {
                g.compile_foreign(blueprint, foreign)?.into_iter().collect()
            }
            Command::Primary(primary) => {
                g.compile_primary(blueprint, primary)?.into_iter().collect()
            }
            Command::DropForeign { index } => vec![g.compile_drop_foreign(blueprint, index)?],
            Command::DropPrimary { index } => vec![g.compile_drop_primary(blueprint, index)?],
        };
        Ok(statements)
    }

    /// Checks blueprint-wide invariants before any SQL is produced.
    fn validate(&self, blueprint: &Blueprint) -> Result<()> {
        let table = blueprint.table();

        if blueprint.commands_named("primary").count() > 1 {
            return Err(SchemaError::DuplicatePrimaryKey {
                dialect: self.dialect(),
                table: table.to_string(),
            });
        }

        if blueprint.commands_named("primary").next().is_some()
            && let Some(column) = blueprint.columns().iter().find(|c| c.is_increment())
        {
            return Err(SchemaError::ConflictingPrimaryKey {
                dialect: self.dialect(),
                table: table.to_string(),
                column: column.name.clone(),
            });
        }

        if let Some(column) = blueprint
            .columns()
            .iter()
            .find(|c| matches!(&c.column_type, ColumnType::Enum { values } if values.is_empty()))
        {
            return Err(SchemaError::EmptyEnum {
                table: table.to_string(),
                column: column.name.clone(),
            });
        }

        // Inline-key dialects only know keys at creation time; without a
        // create command they would vanish.
        if self.grammar.capabilities().inline_keys && !blueprint.creates_table() {
            for command in blueprint.commands() {
                if matches!(command, Command::Primary(_) | Command::Foreign(_)) {
                    return Err(self.grammar.unsupported(command.name()));
                }
            }
        }

        for command in blueprint.commands() {
            let empty = match command {
                Command::Create | Command::Add => blueprint.columns().is_empty(),
                Command::DropColumn { columns } => columns.is_empty(),
                Command::Unique(index) | Command::Index(index) | Command::Primary(index) => {
                    index.columns.is_empty()
                }
                Command::Foreign(foreign) => {
                    foreign.columns.is_empty() || foreign.references.is_empty()
                }
                _ => false,
            };
            if empty {
                return Err(SchemaError::EmptyColumns {
                    operation: command.name(),
                    table: table.to_string(),
                });
            }
        }

        Ok(())
    }
}
