//! Byte-for-byte copies of the database file.
//!
//! None of these functions open the database, they copy the file as is. The
//! caller must drop any open [PocketPlanner](crate::PocketPlanner) before
//! calling [restore_database].

use std::{
    fs,
    path::{Path, PathBuf},
};

use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

/// The timestamp format used in automatic backup file names.
const BACKUP_NAME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");

/// Copy the database at `db_path` to `destination`, replacing any file
/// already there.
///
/// Returns the number of bytes copied.
///
/// # Errors
/// Returns an [Error::IoError] if the database cannot be read, the
/// destination cannot be written, or both paths name the same file.
pub fn backup_database(db_path: &Path, destination: &Path) -> Result<u64, Error> {
    ensure_distinct(db_path, destination)?;

    let bytes = fs::copy(db_path, destination)?;

    tracing::info!(
        "Backed up {} to {} ({bytes} bytes)",
        db_path.display(),
        destination.display()
    );

    Ok(bytes)
}

/// Copy the database into `backup_dir` under a name stamped with `now`,
/// e.g. `backup_2025-10-16_18-30-05.db`.
///
/// `backup_dir` is created if it does not exist. Returns `None` without
/// doing anything if there is no database file yet.
///
/// # Errors
/// Returns an [Error::IoError] if the directory cannot be created or the
/// file cannot be copied.
pub fn auto_backup(
    db_path: &Path,
    backup_dir: &Path,
    now: PrimitiveDateTime,
) -> Result<Option<PathBuf>, Error> {
    if !db_path.is_file() {
        tracing::debug!(
            "Skipping automatic backup, {} does not exist",
            db_path.display()
        );
        return Ok(None);
    }

    fs::create_dir_all(backup_dir)?;

    let stamp = now
        .format(BACKUP_NAME_FORMAT)
        .map_err(|error| Error::IoError(error.to_string()))?;
    let destination = backup_dir.join(format!("backup_{stamp}.db"));

    backup_database(db_path, &destination)?;

    Ok(Some(destination))
}

/// Replace the database at `db_path` with a copy of `source`.
///
/// # Errors
/// Returns an [Error::IoError] if `source` is not a file, cannot be copied,
/// or is the database file itself.
pub fn restore_database(source: &Path, db_path: &Path) -> Result<(), Error> {
    if !source.is_file() {
        return Err(Error::IoError(format!(
            "backup file {} does not exist",
            source.display()
        )));
    }

    ensure_distinct(source, db_path)?;
    fs::copy(source, db_path)?;

    tracing::info!("Restored {} from {}", db_path.display(), source.display());

    Ok(())
}

/// Copying a file onto itself truncates it before it is read.
fn ensure_distinct(source: &Path, destination: &Path) -> Result<(), Error> {
    if !destination.exists() {
        return Ok(());
    }

    if fs::canonicalize(source)? == fs::canonicalize(destination)? {
        return Err(Error::IoError(format!(
            "{} and {} are the same file",
            source.display(),
            destination.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use time::macros::datetime;

    use crate::backup::{auto_backup, backup_database, restore_database};

    #[test]
    fn backup_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("planner.db");
        let destination = dir.path().join("copy.db");
        fs::write(&db_path, b"not really sqlite").unwrap();

        let bytes = backup_database(&db_path, &destination).unwrap();

        assert_eq!(bytes, 17);
        assert_eq!(fs::read(&destination).unwrap(), b"not really sqlite");
    }

    #[test]
    fn auto_backup_creates_stamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("planner.db");
        let backup_dir = dir.path().join("AutoBackups");
        fs::write(&db_path, b"data").unwrap();

        let path = auto_backup(&db_path, &backup_dir, datetime!(2025-10-16 18:30:05))
            .unwrap()
            .unwrap();

        assert_eq!(path, backup_dir.join("backup_2025-10-16_18-30-05.db"));
        assert_eq!(fs::read(path).unwrap(), b"data");
    }

    #[test]
    fn auto_backup_without_database_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let backup_dir = dir.path().join("AutoBackups");

        let result = auto_backup(
            &dir.path().join("missing.db"),
            &backup_dir,
            datetime!(2025-10-16 18:30:05),
        );

        assert_eq!(result, Ok(None));
        assert!(!backup_dir.exists());
    }

    #[test]
    fn restore_replaces_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("planner.db");
        let source = dir.path().join("backup.db");
        fs::write(&db_path, b"new").unwrap();
        fs::write(&source, b"old").unwrap();

        restore_database(&source, &db_path).unwrap();

        assert_eq!(fs::read(&db_path).unwrap(), b"old");
    }

    #[test]
    fn backup_onto_itself_fails_and_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("planner.db");
        fs::write(&db_path, b"precious data").unwrap();

        let result = backup_database(&db_path, &dir.path().join(".").join("planner.db"));

        assert!(result.is_err());
        assert_eq!(fs::read(&db_path).unwrap(), b"precious data");
    }

    #[test]
    fn restore_onto_itself_fails_and_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("planner.db");
        fs::write(&db_path, b"precious data").unwrap();

        let result = restore_database(&db_path, &db_path);

        assert!(result.is_err());
        assert_eq!(fs::read(&db_path).unwrap(), b"precious data");
    }

    #[test]
    fn restore_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("planner.db");
        fs::write(&db_path, b"keep").unwrap();

        let result = restore_database(&dir.path().join("missing.db"), &db_path);

        assert!(result.is_err());
        assert_eq!(fs::read(&db_path).unwrap(), b"keep");
    }
}
