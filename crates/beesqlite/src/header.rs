use std::{fs::File, io::Read, path::Path};

/// The first 16 bytes of every SQLite 3 database file.
pub const SQLITE_HEADER: [u8; 16] = *b"SQLite format 3\0";

/// Does `path` start with the SQLite 3 file header?
///
/// Missing, unreadable or short files are not databases. A freshly created
/// database stays empty, and so fails this check, until something is written
/// to it.
pub fn is_database_file(path: impl AsRef<Path>) -> bool {
    let mut header = [0u8; SQLITE_HEADER.len()];
    match File::open(path).and_then(|mut f| f.read_exact(&mut header)) {
        Ok(()) => header == SQLITE_HEADER,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempdir::TempDir;

    use super::*;

    #[test]
    fn header_bytes() {
        assert_eq!(
            SQLITE_HEADER,
            [
                0x53, 0x51, 0x4c, 0x69, 0x74, 0x65, 0x20, 0x66, 0x6f, 0x72, 0x6d, 0x61, 0x74, 0x20,
                0x33, 0x00
            ]
        );
    }

    #[test]
    fn probe() -> anyhow::Result<()> {
        let dir = TempDir::new("beesqlite-header")?;

        let missing = dir.path().join("missing.db");
        assert!(!is_database_file(&missing));

        let short = dir.path().join("short.db");
        fs::write(&short, b"SQLite format")?;
        assert!(!is_database_file(&short));

        let wrong = dir.path().join("wrong.db");
        fs::write(&wrong, b"SQLite format 2\0 and then some")?;
        assert!(!is_database_file(&wrong));

        let exact = dir.path().join("exact.db");
        fs::write(&exact, SQLITE_HEADER)?;
        assert!(is_database_file(&exact));

        let mut longer = SQLITE_HEADER.to_vec();
        longer.extend_from_slice(&[0u8; 100]);
        let good = dir.path().join("good.db");
        fs::write(&good, longer)?;
        assert!(is_database_file(&good));

        // a directory cannot be read as a file
        assert!(!is_database_file(dir.path()));
        Ok(())
    }
}
