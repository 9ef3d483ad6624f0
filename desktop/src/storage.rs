use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use hydra_core::clock::Rtc;
use hydra_core::config::{ConfigStore, StoreError};
use hydra_core::fs::{DirEntry, Filesystem, RemovableFilesystem};
use hydra_core::handoff::{HandoffError, HandoffRecord, HandoffRegion};
use log::{debug, warn};

const CONFIG_FILE: &str = "config.txt";
const HANDOFF_FILE: &str = ".handoff";
const RTC_FILE: &str = ".rtc";

pub struct HostEntry {
    name: String,
    dir: bool,
}

impl DirEntry for HostEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_directory(&self) -> bool {
        self.dir
    }
}

/// A host directory standing in for a storage root.
pub struct HostDir {
    root: PathBuf,
    mount: &'static str,
}

impl HostDir {
    pub fn new<P: AsRef<Path>>(root: P, mount: &'static str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            mount,
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl embedded_io::ErrorType for HostDir {
    type Error = io::Error;
}

impl Filesystem for HostDir {
    type Entry = HostEntry;

    fn mount_point(&self) -> &str {
        self.mount
    }

    fn list_dir(&mut self, path: &str) -> Result<Vec<HostEntry>, io::Error> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            entries.push(HostEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                dir: file_type.is_dir(),
            });
        }
        // read_dir order is platform dependent.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn exists(&mut self, path: &str) -> Result<bool, io::Error> {
        self.resolve(path).try_exists()
    }

    fn create_dir(&mut self, path: &str) -> Result<(), io::Error> {
        fs::create_dir_all(self.resolve(path))
    }
}

/// A host directory that counts as inserted only while it exists.
pub struct HostCard {
    dir: HostDir,
    mounted: bool,
}

impl HostCard {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            dir: HostDir::new(root, hydra_core::fs::CARD_MOUNT),
            mounted: false,
        }
    }

    fn check_mounted(&self) -> Result<(), io::Error> {
        if self.mounted {
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::NotConnected, "card not mounted"))
        }
    }
}

impl embedded_io::ErrorType for HostCard {
    type Error = io::Error;
}

impl Filesystem for HostCard {
    type Entry = HostEntry;

    fn mount_point(&self) -> &str {
        self.dir.mount_point()
    }

    fn list_dir(&mut self, path: &str) -> Result<Vec<HostEntry>, io::Error> {
        self.check_mounted()?;
        self.dir.list_dir(path)
    }

    fn exists(&mut self, path: &str) -> Result<bool, io::Error> {
        self.check_mounted()?;
        self.dir.exists(path)
    }

    fn create_dir(&mut self, path: &str) -> Result<(), io::Error> {
        self.check_mounted()?;
        self.dir.create_dir(path)
    }
}

impl RemovableFilesystem for HostCard {
    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn mount(&mut self) -> Result<(), io::Error> {
        if !self.dir.root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} missing", self.dir.root.display()),
            ));
        }
        debug!("Mounted {} at {}", self.dir.root.display(), self.dir.mount);
        self.mounted = true;
        Ok(())
    }

    fn release(&mut self) -> Result<(), io::Error> {
        self.mounted = false;
        Ok(())
    }
}

/// Configuration kept as a text file in the flash directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(flash_dir: P) -> Self {
        Self {
            path: flash_dir.as_ref().join(CONFIG_FILE),
        }
    }
}

impl ConfigStore for FileStore {
    fn load(&mut self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("Could not read {}: {}", self.path.display(), err);
                None
            }
        }
    }

    fn save(&mut self, text: &str) -> Result<(), StoreError> {
        fs::write(&self.path, text).map_err(|err| {
            warn!("Could not write {}: {}", self.path.display(), err);
            StoreError::Write
        })
    }
}

/// Handoff region kept as a dotfile in the flash directory. An empty or
/// missing file is the "no pending handoff" state.
pub struct FileHandoff {
    path: PathBuf,
}

impl FileHandoff {
    pub fn new<P: AsRef<Path>>(flash_dir: P) -> Self {
        Self {
            path: flash_dir.as_ref().join(HANDOFF_FILE),
        }
    }
}

impl HandoffRegion for FileHandoff {
    fn write(&mut self, record: &HandoffRecord) -> Result<(), HandoffError> {
        fs::write(&self.path, record.path()).map_err(|err| {
            warn!("Could not write {}: {}", self.path.display(), err);
            HandoffError::Region
        })
    }

    fn read(&mut self) -> Option<HandoffRecord> {
        let text = fs::read_to_string(&self.path).ok()?;
        HandoffRecord::new(text.trim()).ok()
    }

    fn clear(&mut self) -> Result<(), HandoffError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                warn!("Could not clear {}: {}", self.path.display(), err);
                Err(HandoffError::Region)
            }
        }
    }
}

fn host_unix_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}

/// RTC kept as a dotfile holding its offset from the host clock, so it keeps
/// counting while the process is gone. Deleting the file is a power loss.
pub struct FileRtc {
    path: PathBuf,
}

impl FileRtc {
    pub fn new<P: AsRef<Path>>(flash_dir: P) -> Self {
        Self {
            path: flash_dir.as_ref().join(RTC_FILE),
        }
    }
}

impl Rtc for FileRtc {
    fn now_unix_secs(&mut self) -> Option<u64> {
        let text = fs::read_to_string(&self.path).ok()?;
        let offset: i64 = match text.trim().parse() {
            Ok(offset) => offset,
            Err(err) => {
                warn!("Ignoring unreadable {}: {}", self.path.display(), err);
                return None;
            }
        };
        u64::try_from(host_unix_secs() + offset).ok()
    }

    fn set_unix_secs(&mut self, unix_secs: u64) {
        let offset = unix_secs as i64 - host_unix_secs();
        if let Err(err) = fs::write(&self.path, offset.to_string()) {
            warn!("Could not write {}: {}", self.path.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydra_core::catalog::{self, Origin};
    use hydra_core::fs::{APPS_DIR, FLASH_MOUNT};
    use tempfile::TempDir;

    #[test]
    fn test_flash_listing_marks_directories() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("apps/lib")).unwrap();
        fs::write(root.path().join("apps/Chess.py"), "").unwrap();

        let mut flash = HostDir::new(root.path(), FLASH_MOUNT);
        let entries = flash.list_dir(APPS_DIR).unwrap();
        let names: Vec<(&str, bool)> = entries.iter().map(|e| (e.name(), e.is_directory())).collect();
        assert_eq!(names, [("Chess.py", false), ("lib", true)]);
    }

    #[test]
    fn test_missing_card_does_not_mount() {
        let root = TempDir::new().unwrap();
        let mut card = HostCard::new(root.path().join("sd"));
        assert!(card.mount().is_err());
        assert!(card.list_dir(APPS_DIR).is_err());
    }

    #[test]
    fn test_scan_over_host_directories() {
        let flash_root = TempDir::new().unwrap();
        let card_root = TempDir::new().unwrap();
        fs::create_dir(flash_root.path().join("apps")).unwrap();
        fs::write(flash_root.path().join("apps/Snake.py"), "").unwrap();
        fs::write(card_root.path().join("ignored.txt"), "").unwrap();

        let mut flash = HostDir::new(flash_root.path(), FLASH_MOUNT);
        let mut card = HostCard::new(card_root.path());
        fs::create_dir(card_root.path().join("apps")).unwrap();
        fs::write(card_root.path().join("apps/Snake.mpy"), "").unwrap();

        let catalog = catalog::scan(&mut flash, &mut card);
        let snake = catalog.app("Snake").unwrap();
        assert_eq!(snake.path, "/sd/apps/Snake.mpy");
        assert_eq!(snake.origin, Origin::Card);
        assert!(card.is_mounted());
    }

    #[test]
    fn test_scan_creates_apps_dir() {
        let root = TempDir::new().unwrap();
        let mut flash = HostDir::new(root.path(), FLASH_MOUNT);
        let mut card = HostCard::new(root.path().join("absent"));
        let catalog = catalog::scan(&mut flash, &mut card);
        assert_eq!(catalog.len(), 3);
        assert!(root.path().join("apps").is_dir());
    }

    #[test]
    fn test_config_store_round_trip() {
        let root = TempDir::new().unwrap();
        let mut store = FileStore::new(root.path());
        assert_eq!(store.load(), None);
        store.save("ui_sound=false\n").unwrap();
        assert_eq!(store.load().as_deref(), Some("ui_sound=false\n"));
    }

    #[test]
    fn test_handoff_file_lifecycle() {
        let root = TempDir::new().unwrap();
        let mut region = FileHandoff::new(root.path());
        assert_eq!(region.read(), None);

        let record = HandoffRecord::new("/apps/Chess.py").unwrap();
        region.write(&record).unwrap();
        assert_eq!(region.read(), Some(record));

        region.clear().unwrap();
        assert_eq!(region.read(), None);
        region.clear().unwrap();
    }

    #[test]
    fn test_rtc_keeps_counting_across_instances() {
        let root = TempDir::new().unwrap();
        assert_eq!(FileRtc::new(root.path()).now_unix_secs(), None);

        FileRtc::new(root.path()).set_unix_secs(1_700_000_000);
        let now = FileRtc::new(root.path()).now_unix_secs().unwrap();
        assert!((1_700_000_000..1_700_000_005).contains(&now));
    }

    #[test]
    fn test_corrupt_rtc_file_reads_as_unset() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join(RTC_FILE), "soon").unwrap();
        assert_eq!(FileRtc::new(root.path()).now_unix_secs(), None);
    }
}
