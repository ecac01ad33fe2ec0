use eyre::Context as _;
use rand::Rng as _;
use std::{
    fs::{self, OpenOptions},
    io::Write as _,
    path::{Path, PathBuf},
};

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt as _, PermissionsExt as _};

pub const MODE_DIR_PRIVATE: u32 = 0o700;
pub const MODE_FILE_PRIVATE: u32 = 0o600;

fn refuse_symlink(p: &Path) -> eyre::Result<()> {
    let md = fs::symlink_metadata(p).with_context(|| format!("stat {}", p.display()))?;
    if md.file_type().is_symlink() {
        eyre::bail!("refusing to use symlink: {}", p.display());
    }
    Ok(())
}

/// Create `dir` if missing and clamp it to owner-only permissions on Unix.
pub fn ensure_private_dir(dir: &Path) -> eyre::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    }
    refuse_symlink(dir)?;
    let md = fs::metadata(dir).with_context(|| format!("stat {}", dir.display()))?;
    if !md.is_dir() {
        eyre::bail!("expected directory at {}", dir.display());
    }

    #[cfg(unix)]
    {
        if md.permissions().mode() & 0o077 != 0 {
            fs::set_permissions(dir, fs::Permissions::from_mode(MODE_DIR_PRIVATE))
                .with_context(|| format!("chmod {MODE_DIR_PRIVATE:o} {}", dir.display()))?;
        }
    }

    Ok(())
}

fn sibling_tmp_path(path: &Path) -> eyre::Result<PathBuf> {
    let parent = path
        .parent()
        .ok_or_else(|| eyre::eyre!("missing parent for {}", path.display()))?;
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let mut suffix = [0_u8; 8];
    rand::rng().fill_bytes(&mut suffix);
    Ok(parent.join(format!(".{base}.tmp.{}", hex::encode(suffix))))
}

/// Write `contents` to `path` via a fresh temp file and a rename, with owner-only permissions.
pub fn write_private_atomic(path: &Path, contents: &str) -> eyre::Result<()> {
    let tmp = sibling_tmp_path(path)?;
    if let Some(parent) = tmp.parent() {
        ensure_private_dir(parent)?;
    }
    if path.exists() {
        refuse_symlink(path)?;
    }

    let mut oo = OpenOptions::new();
    oo.create_new(true).write(true);
    #[cfg(unix)]
    {
        oo.mode(MODE_FILE_PRIVATE);
    }
    let mut f = oo
        .open(&tmp)
        .with_context(|| format!("open temp {}", tmp.display()))?;
    f.write_all(contents.as_bytes())
        .with_context(|| format!("write {}", tmp.display()))?;
    f.sync_all()
        .with_context(|| format!("fsync {}", tmp.display()))?;
    drop(f);

    // `rename` over an existing file fails on Windows.
    #[cfg(windows)]
    {
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("remove existing {}", path.display()))?;
        }
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))
}
