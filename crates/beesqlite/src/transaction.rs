use std::{
    fmt::{self, Debug, Formatter},
    ops::{Deref, DerefMut},
};

use crate::{Connection, Result};

/// An in-progress `BEGIN IMMEDIATE` transaction.
///
/// A transaction starts with a call to [`Connection::transaction`] and should
/// end with [`commit`] or [`rollback`]. If neither is called before the
/// transaction goes out of scope, it is rolled back on drop.
///
/// The transaction dereferences to its [`Connection`], so every connection
/// operation is available on it.
///
/// [`commit`]: Self::commit()
/// [`rollback`]: Self::rollback()
pub struct Transaction<'c> {
    connection: &'c mut Connection,
    open: bool,
}

impl<'c> Transaction<'c> {
    pub(crate) fn begin(connection: &'c mut Connection) -> Result<Self> {
        connection.begin()?;
        Ok(Self {
            connection,
            open: true,
        })
    }

    /// Commits this transaction. If the commit fails the transaction is
    /// still rolled back when dropped.
    pub fn commit(mut self) -> Result<()> {
        self.connection.commit()?;
        self.open = false;
        Ok(())
    }

    /// Aborts this transaction.
    pub fn rollback(mut self) -> Result<()> {
        self.open = false;
        self.connection.rollback()
    }
}

impl Debug for Transaction<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("open", &self.open)
            .field("path", &self.connection.path())
            .finish()
    }
}

impl Deref for Transaction<'_> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &*self.connection
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.connection
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        // a failed statement may already have ended the transaction
        if self.open && self.connection.in_transaction() {
            if let Err(e) = self.connection.rollback() {
                tracing::error!("failed to roll back transaction on drop: {e}");
            }
        }
    }
}
