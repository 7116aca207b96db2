use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use anyhow::Context;
use fs2::FileExt;

/// Exclusive claim on a reminder file, held until dropped.
///
/// A running daemon keeps the claim for its whole lifetime, so a second process can't edit
/// the file underneath it.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    _file: File,
}

impl StoreLock {
    pub fn acquire(store_path: &Path) -> anyhow::Result<Self> {
        let path = lock_path(store_path);
        if let Some(directory) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(directory)
                .with_context(|| format!("Could not create directory {directory:?}"))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Could not open lock file {path:?}"))?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                log::debug!("Locked reminder store {:?}", store_path);
                Ok(Self { path, _file: file })
            }
            Err(error) if error.kind() == fs2::lock_contended_error().kind() => anyhow::bail!(
                "Reminders in {} are in use by another notice process. \
                 Use the prompt of the running `notice run`, or stop it first",
                store_path.display()
            ),
            Err(error) => {
                Err(error).with_context(|| format!("Could not lock {path:?}"))
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn lock_path(store_path: &Path) -> PathBuf {
    let mut file_name = store_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "reminders.json".into());
    file_name.push(".lock");
    store_path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_while_first_is_held() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("reminders.json");

        let held = StoreLock::acquire(&store).unwrap();
        let refused = StoreLock::acquire(&store).unwrap_err();

        assert!(refused.to_string().contains("in use by another notice process"));
        assert_eq!(held.path(), dir.path().join("reminders.json.lock"));
    }

    #[test]
    fn claim_is_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("nested").join("reminders.json");

        drop(StoreLock::acquire(&store).unwrap());

        assert!(StoreLock::acquire(&store).is_ok());
    }
}
