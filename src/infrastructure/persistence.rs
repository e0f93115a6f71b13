use crate::application::{SnapshotStore, ThemeStore};
use crate::domain::{StorageError, Theme, WizardState};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_FILE: &str = "pyramyd-application-storage.json";
pub const THEME_FILE: &str = "theme";

/// Stores the wizard snapshot and theme preference as files in one
/// directory. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileRepository {
    dir: PathBuf,
}

impl FileRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    pub fn theme_path(&self) -> PathBuf {
        self.dir.join(THEME_FILE)
    }

    fn read(path: &Path) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_error)?;
        fs::write(path, content).map_err(io_error)
    }
}

impl SnapshotStore for FileRepository {
    fn load(&self) -> Result<Option<WizardState>, StorageError> {
        let path = self.snapshot_path();
        let Some(content) = Self::read(&path)? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StorageError::Format { path, source })
    }

    fn save(&self, state: &WizardState) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(state)?;
        self.write(&self.snapshot_path(), &json)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let path = self.snapshot_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

impl ThemeStore for FileRepository {
    /// An unrecognised value counts as no preference.
    fn load_theme(&self) -> Result<Option<Theme>, StorageError> {
        Ok(Self::read(&self.theme_path())?.and_then(|value| Theme::parse(&value)))
    }

    fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.write(&self.theme_path(), theme.as_str())
    }
}

/// Interprets `COLORFGBG` (`"fg;bg"`): background colours 0-6 and 8 are dark.
pub fn theme_from_colorfgbg(value: &str) -> Option<Theme> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match background {
        0..=6 | 8 => Some(Theme::Dark),
        _ => Some(Theme::Light),
    }
}

/// The terminal's own light/dark signal, defaulting to light.
pub fn system_theme() -> Theme {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|value| theme_from_colorfgbg(&value))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FormStep, LoanPurpose};
    use tempfile::TempDir;

    #[test]
    fn test_missing_snapshot_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileRepository::new(temp_dir.path().join("nested"));
        assert!(repo.load().unwrap().is_none());
        assert!(repo.load_theme().unwrap().is_none());
    }

    #[test]
    fn test_snapshot_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileRepository::new(temp_dir.path().join("nested"));

        let mut state = WizardState::default();
        state.is_form_started = true;
        state.current_step = FormStep::LoanDetails;
        state.completed_steps.insert(FormStep::PersonalInfo);
        state.loan_details.loan_purpose = Some(LoanPurpose::HomePurchase);
        state.loan_details.down_payment = Some(2500.0);

        repo.save(&state).unwrap();
        assert!(repo.snapshot_path().exists());
        assert_eq!(repo.load().unwrap(), Some(state));
    }

    #[test]
    fn test_corrupt_snapshot_is_format_error() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileRepository::new(temp_dir.path());
        fs::write(repo.snapshot_path(), "{ not json").unwrap();

        let err = repo.load().unwrap_err();
        assert!(matches!(err, StorageError::Format { .. }));
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileRepository::new(temp_dir.path());
        repo.save(&WizardState::default()).unwrap();
        repo.clear().unwrap();
        assert!(!repo.snapshot_path().exists());
        repo.clear().unwrap();
    }

    #[test]
    fn test_theme_file() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileRepository::new(temp_dir.path());
        repo.save_theme(Theme::Dark).unwrap();
        assert_eq!(fs::read_to_string(repo.theme_path()).unwrap(), "dark");
        assert_eq!(repo.load_theme().unwrap(), Some(Theme::Dark));

        fs::write(repo.theme_path(), "sepia").unwrap();
        assert_eq!(repo.load_theme().unwrap(), None);
    }

    #[test]
    fn test_colorfgbg() {
        assert_eq!(theme_from_colorfgbg("15;0"), Some(Theme::Dark));
        assert_eq!(theme_from_colorfgbg("0;8"), Some(Theme::Dark));
        assert_eq!(theme_from_colorfgbg("0;15"), Some(Theme::Light));
        assert_eq!(theme_from_colorfgbg("12;7"), Some(Theme::Light));
        assert_eq!(theme_from_colorfgbg("garbage"), None);
    }
}
