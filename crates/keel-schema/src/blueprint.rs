//! Blueprint representation types.
//!
//! A [`Blueprint`] describes one table: its name, the columns it declares and
//! the ordered list of commands to compile against it. Blueprints are built
//! once per schema change and only borrowed by the compiler.

use serde::{Deserialize, Serialize};

/// Column types understood by every dialect.
///
/// Each dialect maps this enum exhaustively, so adding a variant is a build
/// error until every grammar handles it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnType {
    /// Variable-length string.
    String {
        /// Maximum length, for dialects that declare one.
        #[serde(default = "default_length")]
        length: u32,
    },
    /// Unbounded text.
    Text,
    /// Integer.
    Integer,
    /// Floating point.
    Float {
        /// Total digits.
        #[serde(default = "default_precision")]
        precision: u8,
        /// Digits after the decimal point.
        #[serde(default = "default_scale")]
        scale: u8,
    },
    /// Fixed-point decimal.
    Decimal {
        /// Total digits.
        #[serde(default = "default_precision")]
        precision: u8,
        /// Digits after the decimal point.
        #[serde(default = "default_scale")]
        scale: u8,
    },
    /// Boolean.
    Boolean,
    /// One of a fixed set of string values.
    Enum {
        /// Allowed values.
        values: Vec<String>,
    },
    /// Date only.
    Date,
    /// Date and time.
    DateTime,
    /// Time only.
    Time,
    /// Timestamp.
    Timestamp,
    /// Binary data.
    Binary,
}

const fn default_length() -> u32 {
    255
}

const fn default_precision() -> u8 {
    8
}

const fn default_scale() -> u8 {
    2
}

impl ColumnType {
    /// Every column type with its default parameters; `enum` gets the
    /// sample values `a` and `b`.
    #[must_use]
    pub fn all() -> Vec<Self> {
        vec![
            Self::String {
                length: default_length(),
            },
            Self::Text,
            Self::Integer,
            Self::Float {
                precision: default_precision(),
                scale: default_scale(),
            },
            Self::Decimal {
                precision: default_precision(),
                scale: default_scale(),
            },
            Self::Boolean,
            Self::Enum {
                values: vec!["a".to_string(), "b".to_string()],
            },
            Self::Date,
            Self::DateTime,
            Self::Time,
            Self::Timestamp,
            Self::Binary,
        ]
    }

    /// Returns the type name as used in serialized blueprints.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float { .. } => "float",
            Self::Decimal { .. } => "decimal",
            Self::Boolean => "boolean",
            Self::Enum { .. } => "enum",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Binary => "binary",
        }
    }
}

/// Default value for a column.
///
/// Schema statements are never parameterized, so defaults are inlined as
/// literals by the grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// Boolean default.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default, rendered as a quoted literal.
    String(String),
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Schema definition for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column type.
    #[serde(flatten)]
    pub column_type: ColumnType,
    /// Whether the column allows NULL values.
    #[serde(default)]
    pub nullable: bool,
    /// Default value.
    #[serde(default, rename = "defaultValue", skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Whether this column auto-increments.
    #[serde(default)]
    pub auto_increment: bool,
}

impl Column {
    /// Creates a non-nullable column with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            default: None,
            auto_increment: false,
        }
    }

    /// A `varchar(255)` style column.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(
            name,
            ColumnType::String {
                length: default_length(),
            },
        )
    }

    /// A string column with an explicit length.
    #[must_use]
    pub fn string_with_length(name: impl Into<String>, length: u32) -> Self {
        Self::new(name, ColumnType::String { length })
    }

    /// A text column.
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    /// An integer column.
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    /// An auto-incrementing integer primary key.
    #[must_use]
    pub fn increments(name: impl Into<String>) -> Self {
        Self::integer(name).auto_increment()
    }

    /// A float column.
    #[must_use]
    pub fn float(name: impl Into<String>, precision: u8, scale: u8) -> Self {
        Self::new(name, ColumnType::Float { precision, scale })
    }

    /// A decimal column.
    #[must_use]
    pub fn decimal(name: impl Into<String>, precision: u8, scale: u8) -> Self {
        Self::new(name, ColumnType::Decimal { precision, scale })
    }

    /// A boolean column.
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Boolean)
    }

    /// An enum column restricted to `values`.
    #[must_use]
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            ColumnType::Enum {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// A date column.
    #[must_use]
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Date)
    }

    /// A date-time column.
    #[must_use]
    pub fn date_time(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::DateTime)
    }

    /// A time column.
    #[must_use]
    pub fn time(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Time)
    }

    /// A timestamp column.
    #[must_use]
    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Timestamp)
    }

    /// A binary column.
    #[must_use]
    pub fn binary(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Binary)
    }

    /// Allows NULL values.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<DefaultValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Whether the increment modifier applies to this column.
    #[must_use]
    pub fn is_increment(&self) -> bool {
        self.auto_increment && self.column_type == ColumnType::Integer
    }
}

/// Foreign key action (ON DELETE, ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ForeignKeyAction {
    /// No action.
    NoAction,
    /// Restrict.
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the referencing column to NULL.
    SetNull,
    /// Set the referencing column to its default.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "no action",
            Self::Restrict => "restrict",
            Self::Cascade => "cascade",
            Self::SetNull => "set null",
            Self::SetDefault => "set default",
        }
    }
}

/// Payload of `unique`, `index` and `primary` commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCommand {
    /// Index (or constraint) name.
    pub index: String,
    /// Indexed columns.
    pub columns: Vec<String>,
}

/// Payload of a `foreign` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignCommand {
    /// Constraint name.
    pub index: String,
    /// Referencing columns on this table.
    pub columns: Vec<String>,
    /// Referenced table.
    pub on: String,
    /// Referenced columns.
    pub references: Vec<String>,
    /// ON DELETE action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ForeignKeyAction>,
    /// ON UPDATE action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ForeignKeyAction>,
}

/// A single schema operation on the blueprint's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum Command {
    /// Create the table with the blueprint's columns.
    Create,
    /// Add the blueprint's columns to an existing table.
    Add,
    /// Rename the table.
    Rename {
        /// New table name.
        to: String,
    },
    /// Drop the table.
    DropTable,
    /// Drop the table if it exists.
    DropTableIfExists,
    /// Drop columns.
    DropColumn {
        /// Columns to drop.
        columns: Vec<String>,
    },
    /// Add a unique index.
    Unique(IndexCommand),
    /// Add a plain index.
    Index(IndexCommand),
    /// Drop a unique index.
    DropUnique {
        /// Index name.
        index: String,
    },
    /// Drop a plain index.
    DropIndex {
        /// Index name.
        index: String,
    },
    /// Add a foreign key.
    Foreign(ForeignCommand),
    /// Add the primary key.
    Primary(IndexCommand),
    /// Drop a foreign key.
    DropForeign {
        /// Constraint name.
        index: String,
    },
    /// Drop the primary key.
    DropPrimary {
        /// Constraint name.
        index: String,
    },
}

impl Command {
    /// Returns the command name, as used in error messages and serialized
    /// blueprints.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Add => "add",
            Self::Rename { .. } => "rename",
            Self::DropTable => "dropTable",
            Self::DropTableIfExists => "dropTableIfExists",
            Self::DropColumn { .. } => "dropColumn",
            Self::Unique(_) => "unique",
            Self::Index(_) => "index",
            Self::DropUnique { .. } => "dropUnique",
            Self::DropIndex { .. } => "dropIndex",
            Self::Foreign(_) => "foreign",
            Self::Primary(_) => "primary",
            Self::DropForeign { .. } => "dropForeign",
            Self::DropPrimary { .. } => "dropPrimary",
        }
    }
}

/// Kind of index, used to derive index names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Unique index.
    Unique,
    /// Plain index.
    Index,
    /// Foreign key constraint.
    Foreign,
    /// Primary key constraint.
    Primary,
}

impl IndexKind {
    fn suffix(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::Index => "index",
            Self::Foreign => "foreign",
            Self::Primary => "primary",
        }
    }
}

/// Desired schema of one table: its columns and the commands to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    table: String,
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    commands: Vec<Command>,
}

impl Blueprint {
    /// Creates an empty blueprint for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Declared columns, in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Commands, in the order they will be compiled.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a command.
    #[must_use]
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Appends a `create` command.
    #[must_use]
    pub fn create(self) -> Self {
        self.command(Command::Create)
    }

    /// Appends an `add` command.
    #[must_use]
    pub fn add(self) -> Self {
        self.command(Command::Add)
    }

    /// Appends a `rename` command.
    #[must_use]
    pub fn rename(self, to: impl Into<String>) -> Self {
        self.command(Command::Rename { to: to.into() })
    }

    /// Appends a `dropTable` command.
    #[must_use]
    pub fn drop_table(self) -> Self {
        self.command(Command::DropTable)
    }

    /// Appends a `dropTableIfExists` command.
    #[must_use]
    pub fn drop_table_if_exists(self) -> Self {
        self.command(Command::DropTableIfExists)
    }

    /// Appends a `dropColumn` command.
    #[must_use]
    pub fn drop_column(self, columns: &[&str]) -> Self {
        self.command(Command::DropColumn {
            columns: owned(columns),
        })
    }

    /// Appends a `unique` command with a derived index name.
    #[must_use]
    pub fn unique(self, columns: &[&str]) -> Self {
        let index = self.index_name(IndexKind::Unique, columns);
        self.command(Command::Unique(IndexCommand {
            index,
            columns: owned(columns),
        }))
    }

    /// Appends an `index` command with a derived index name.
    #[must_use]
    pub fn index(self, columns: &[&str]) -> Self {
        let index = self.index_name(IndexKind::Index, columns);
        self.command(Command::Index(IndexCommand {
            index,
            columns: owned(columns),
        }))
    }

    /// Appends a `primary` command with a derived constraint name.
    #[must_use]
    pub fn primary(self, columns: &[&str]) -> Self {
        let index = self.index_name(IndexKind::Primary, columns);
        self.command(Command::Primary(IndexCommand {
            index,
            columns: owned(columns),
        }))
    }

    /// Appends a `foreign` command with a derived constraint name.
    #[must_use]
    pub fn foreign(self, columns: &[&str], on: &str, references: &[&str]) -> Self {
        let index = self.index_name(IndexKind::Foreign, columns);
        self.command(Command::Foreign(ForeignCommand {
            index,
            columns: owned(columns),
            on: on.to_string(),
            references: owned(references),
            on_delete: None,
            on_update: None,
        }))
    }

    /// Derives a deterministic index name: `{table}_{columns}_{kind}`,
    /// lowercased, with `-` and `.` replaced by `_`.
    #[must_use]
    pub fn index_name(&self, kind: IndexKind, columns: &[&str]) -> String {
        let mut name = self.table.clone();
        for column in columns {
            name.push('_');
            name.push_str(column);
        }
        name.push('_');
        name.push_str(kind.suffix());
        name.to_lowercase().replace(['-', '.'], "_")
    }

    /// Returns every command with the given name.
    pub fn commands_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Command> + 'a {
        self.commands.iter().filter(move |c| c.name() == name)
    }

    /// Whether the blueprint creates its table.
    #[must_use]
    pub fn creates_table(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::Create))
    }
}

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| (*c).to_string()).collect()
}
