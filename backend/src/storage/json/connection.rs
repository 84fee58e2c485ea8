use anyhow::{Context, Result};
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// JsonConnection manages the data directory holding one JSON file per
/// collection. Single-file writes go through a temp file and a rename, and
/// a multi-file commit renames only after every file staged cleanly, so
/// readers never observe a half-written collection.
pub struct JsonConnection {
    base_directory: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonConnection {
    /// Create a connection over a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
        }
        info!("📁 JSON storage at {}", base_path.display());

        Ok(Self {
            base_directory: base_path,
            write_lock: Mutex::new(()),
        })
    }

    /// Create a connection in the default data directory
    /// (`~/Documents/Bicicletario`)
    pub fn new_default() -> Result<Self> {
        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;

        let data_dir = PathBuf::from(home_dir).join("Documents").join("Bicicletario");
        Self::new(data_dir)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    fn collection_path(&self, file_name: &str) -> PathBuf {
        self.base_directory.join(file_name)
    }

    /// Load a collection, defaulting when its file does not exist yet
    pub(crate) fn load_collection<T>(&self, file_name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.collection_path(file_name);
        if !path.exists() {
            debug!("No {} yet, starting empty", file_name);
            return Ok(T::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed JSON in {}", path.display()))
    }

    /// Atomically replace one collection file
    pub(crate) fn save_collection<T: Serialize>(&self, file_name: &str, value: &T) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let json = serde_json::to_string_pretty(value)?;
        let path = self.collection_path(file_name);
        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, json)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    /// Replace several collection files together: every file is staged to a
    /// temp sibling first, renames only start after all writes succeeded.
    /// A staging failure removes the temps and leaves the store untouched.
    pub(crate) fn commit_collections(&self, entries: &[(&str, String)]) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
        for (file_name, json) in entries {
            let path = self.collection_path(file_name);
            let temp_path = path.with_extension("tmp");
            if let Err(e) = fs::write(&temp_path, json) {
                for (stale, _) in &staged {
                    let _ = fs::remove_file(stale);
                }
                let _ = fs::remove_file(&temp_path);
                return Err(e)
                    .with_context(|| format!("Failed to stage {}", temp_path.display()));
            }
            staged.push((temp_path, path));
        }

        for (temp_path, path) in &staged {
            if let Err(e) = fs::rename(temp_path, path) {
                error!(
                    "❌ Snapshot commit interrupted at {}: collections may disagree until the next import",
                    path.display()
                );
                return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
            }
        }
        Ok(())
    }
}
