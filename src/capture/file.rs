//! Writing finished screenshots to disk.

use super::png::encode_png;
use super::types::CaptureError;
use crate::config::SaveConfig;
use crate::draw::PixelBuffer;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Where and under which name a screenshot is written.
#[derive(Debug, Clone)]
pub struct SaveTarget {
    /// Directory to write into; created when missing.
    pub directory: PathBuf,
    /// File stem template with chrono format specifiers.
    pub filename_template: String,
}

impl SaveTarget {
    pub fn from_config(config: &SaveConfig) -> Self {
        Self {
            directory: expand_tilde(&config.directory),
            filename_template: config.filename_template.clone(),
        }
    }
}

impl Default for SaveTarget {
    fn default() -> Self {
        Self::from_config(&SaveConfig::default())
    }
}

/// Formats `template` with the given time and appends `.png`.
pub fn generate_filename(template: &str, time: DateTime<Local>) -> String {
    format!("{}.png", time.format(template))
}

/// Human-readable default name for a capture taken at `time`, without extension.
pub fn default_name(time: DateTime<Local>) -> String {
    format!("Screenshot {}", time.format("%Y-%m-%d %H-%M-%S"))
}

/// Creates `directory` if needed and returns it canonicalized when possible.
pub fn ensure_directory_exists(directory: &Path) -> Result<PathBuf, CaptureError> {
    if !directory.exists() {
        log::info!("Creating screenshot directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }

    Ok(directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf()))
}

/// Writes already encoded bytes to `path` with user-only permissions.
pub fn write_private(path: &Path, bytes: &[u8]) -> Result<(), CaptureError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory_exists(parent)?;
    }

    fs::write(path, bytes)?;

    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, Permissions::from_mode(0o600))?;
    }

    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Encodes `image` and writes it into the target directory under a generated name.
///
/// Returns the path of the written file.
pub fn save_image(image: &PixelBuffer, target: &SaveTarget) -> Result<PathBuf, CaptureError> {
    let directory = ensure_directory_exists(&target.directory)?;
    let filename = generate_filename(&target.filename_template, Local::now());
    let path = directory.join(filename);

    let bytes = encode_png(image)?;
    log::info!(
        "Saving screenshot to: {} ({} bytes)",
        path.display(),
        bytes.len()
    );
    write_private(&path, &bytes)?;
    log::info!("Screenshot saved successfully: {}", path.display());

    Ok(path)
}

/// Expands a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::GREEN;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn filenames_follow_template() {
        assert_eq!(
            generate_filename("shot_%Y%m%d_%H%M%S", fixed_time()),
            "shot_20240309_140507.png"
        );
        assert_eq!(default_name(fixed_time()), "Screenshot 2024-03-09 14-05-07");
    }

    #[test]
    fn expand_tilde_only_touches_home_prefix() {
        let expanded = expand_tilde("~/Pictures");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn save_image_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = SaveTarget {
            directory: dir.path().join("shots"),
            filename_template: "annotated".into(),
        };
        let path = save_image(&PixelBuffer::filled(4, 4, GREEN), &target).unwrap();
        assert!(path.ends_with("annotated.png"));
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
