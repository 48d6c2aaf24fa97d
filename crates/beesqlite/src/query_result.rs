/// Outcome of a write: rows changed and the rowid of the last insert.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryResult {
    pub(crate) changes: u64,
    pub(crate) last_insert_rowid: i64,
}

impl QueryResult {
    pub fn rows_affected(&self) -> u64 {
        self.changes
    }

    /// Rowid of the most recent successful insert on the connection. Left
    /// unchanged by statements that insert nothing.
    pub fn last_insert_rowid(&self) -> i64 {
        self.last_insert_rowid
    }
}
