//! JOIN fragments.
//!
//! A `Join` represents one joined table with a single-letter alias
//! derived from the first character of the table's name. Alias
//! collisions between joins are not detected; callers joining two
//! tables with the same first letter must alias manually via raw SQL.

/// A joined table and its accumulated ON fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    table: String,
    alias: String,
    fragments: Vec<String>,
}

impl Join {
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        let alias = table.chars().next().map(String::from).unwrap_or_default();
        Join {
            table,
            alias,
            fragments: Vec::new(),
        }
    }

    /// Appends one join fragment:
    /// `JOIN <table> <alias> ON <alias>.<left> <op> <right>`.
    pub fn on(mut self, left: &str, op: &str, right: &str) -> Self {
        self.fragments.push(format!(
            "JOIN {} {} ON {}.{} {} {}",
            self.table, self.alias, self.alias, left, op, right
        ));
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// All fragments, space-separated, in accumulation order.
    pub fn render(&self) -> String {
        self.fragments.join(" ")
    }
}
