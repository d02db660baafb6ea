use crate::document::FileType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const LAYOUT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub created_at: String,
    pub version: u32,
}

/// On-disk layout of a data directory:
/// `meta.json`, `db/` for the sled database and `uploads/` for stored files.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn db(&self) -> PathBuf { self.root.join("db") }
    pub fn uploads_dir(&self) -> PathBuf { self.root.join("uploads") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    /// Absolute path of a stored file given its path relative to the root.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel.trim_start_matches('/'))
    }
}

pub fn save_meta(paths: &DataPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &DataPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Create the directory layout, writing `meta.json` on first use and
/// rejecting directories written by an incompatible layout version.
pub fn init_data_dir(paths: &DataPaths) -> Result<MetaFile> {
    create_dir_all(paths.uploads_dir())
        .with_context(|| format!("cannot create {}", paths.uploads_dir().display()))?;
    if paths.meta().exists() {
        let meta = load_meta(paths).context("cannot read meta.json")?;
        anyhow::ensure!(
            meta.version == LAYOUT_VERSION,
            "data directory layout v{} is not supported (expected v{LAYOUT_VERSION})",
            meta.version
        );
        return Ok(meta);
    }
    let meta = MetaFile {
        created_at: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        version: LAYOUT_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), "initialised data directory");
    Ok(meta)
}

/// Store an uploaded file under a fresh name; returns its path relative to the root.
pub fn save_upload(paths: &DataPaths, bytes: &[u8], file_type: FileType) -> io::Result<String> {
    let dir = paths.uploads_dir();
    create_dir_all(&dir)?;
    let rel = format!("uploads/{}.{}", uuid::Uuid::new_v4(), file_type.extension());
    fs::write(paths.resolve(&rel), bytes)?;
    Ok(rel)
}

pub fn read_upload(paths: &DataPaths, rel: &str) -> io::Result<Vec<u8>> {
    fs::read(paths.resolve(rel))
}

/// Remove a stored file; a file that is already gone is not an error.
pub fn remove_upload(paths: &DataPaths, rel: &str) -> io::Result<()> {
    match fs::remove_file(paths.resolve(rel)) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
