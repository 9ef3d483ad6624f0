//! Storage roots and the mounter that prepares them for a catalog scan.
//!
//! Two roots exist on the device: internal flash (always present) and a
//! removable card that has to be mounted before it can be listed. Both are
//! reached through [`Filesystem`]; the card adds [`RemovableFilesystem`].

extern crate alloc;

use core::result::Result;

use alloc::{format, string::String, vec::Vec};
use embedded_io::ErrorType;
use log::{debug, warn};

/// Directory under every root that holds launchable applications.
pub const APPS_DIR: &str = "/apps";

/// Mount point of the internal flash root.
pub const FLASH_MOUNT: &str = "";

/// Mount point of the removable card root.
pub const CARD_MOUNT: &str = "/sd";

pub trait Filesystem: ErrorType {
    type Entry: DirEntry;

    /// Prefix prepended to root-relative paths to form absolute ones.
    fn mount_point(&self) -> &str;
    fn list_dir(&mut self, path: &str) -> Result<Vec<Self::Entry>, Self::Error>;
    fn exists(&mut self, path: &str) -> Result<bool, Self::Error>;
    fn create_dir(&mut self, path: &str) -> Result<(), Self::Error>;
}

pub trait RemovableFilesystem: Filesystem {
    fn is_mounted(&self) -> bool;
    fn mount(&mut self) -> Result<(), Self::Error>;
    /// Unmounts and releases the underlying handle. Idempotent.
    fn release(&mut self) -> Result<(), Self::Error>;
}

pub trait DirEntry {
    fn name(&self) -> &str;
    fn is_directory(&self) -> bool;
}

/// A root after preparation: where its `apps` directory lives and whether it
/// can be listed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRoot {
    pub mount_point: String,
    pub apps_ready: bool,
}

impl PreparedRoot {
    pub fn apps_path(&self) -> String {
        format!("{}{}", self.mount_point, APPS_DIR)
    }
}

/// Mounts the card if needed. A failed mount is logged and reported as
/// `false`; the caller carries on with flash only.
pub fn ensure_mounted<R: RemovableFilesystem>(card: &mut R) -> bool {
    if card.is_mounted() {
        return true;
    }
    match card.mount() {
        Ok(()) => {
            debug!("Card mounted at {}", card.mount_point());
            true
        }
        Err(err) => {
            warn!("Could not mount card at {}: {:?}", card.mount_point(), err);
            // A half-initialised handle is worse than none.
            if let Err(err) = card.release() {
                warn!("Could not release card at {}: {:?}", card.mount_point(), err);
            }
            false
        }
    }
}

/// Creates `/apps` on the root when it is missing.
pub fn ensure_apps_dir<F: Filesystem>(fs: &mut F) -> PreparedRoot {
    let mount_point = String::from(fs.mount_point());
    let apps_ready = match fs.exists(APPS_DIR) {
        Ok(true) => true,
        Ok(false) => match fs.create_dir(APPS_DIR) {
            Ok(()) => {
                debug!("Created {}{}", mount_point, APPS_DIR);
                true
            }
            Err(err) => {
                warn!("Could not create {}{}: {:?}", mount_point, APPS_DIR, err);
                false
            }
        },
        Err(err) => {
            warn!("Could not inspect {}: {:?}", mount_point, err);
            false
        }
    };
    PreparedRoot {
        mount_point,
        apps_ready,
    }
}

/// Lists file names in the root's `apps` directory. Directories are left out.
pub fn list_apps<F: Filesystem>(fs: &mut F) -> Result<Vec<String>, F::Error> {
    let entries = fs.list_dir(APPS_DIR)?;
    Ok(entries
        .iter()
        .filter(|entry| !entry.is_directory())
        .map(|entry| String::from(entry.name()))
        .collect())
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory roots shared by the unit tests of several modules.

    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use embedded_io::ErrorKind;

    use crate::platform::mock::EventLog;

    #[derive(Clone, Debug)]
    pub struct MemEntry {
        pub name: String,
        pub dir: bool,
    }

    impl DirEntry for MemEntry {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_directory(&self) -> bool {
            self.dir
        }
    }

    /// A root with a single optional `apps` directory.
    #[derive(Default)]
    pub struct MemFs {
        pub mount: &'static str,
        pub apps: Option<Vec<MemEntry>>,
        pub fail_create: bool,
        pub fail_list: bool,
        pub removable: bool,
        pub mounted: bool,
        pub fail_mount: bool,
        pub releases: usize,
        pub fail_release: bool,
        pub log: EventLog,
    }

    impl MemFs {
        pub fn flash(files: &[&str]) -> Self {
            Self {
                mount: FLASH_MOUNT,
                apps: Some(files.iter().map(|n| file(n)).collect()),
                ..Self::default()
            }
        }

        pub fn card(files: &[&str]) -> Self {
            Self {
                mount: CARD_MOUNT,
                apps: Some(files.iter().map(|n| file(n)).collect()),
                removable: true,
                ..Self::default()
            }
        }

        pub fn no_card() -> Self {
            Self {
                mount: CARD_MOUNT,
                removable: true,
                fail_mount: true,
                ..Self::default()
            }
        }
    }

    pub fn file(name: &str) -> MemEntry {
        MemEntry {
            name: name.to_string(),
            dir: false,
        }
    }

    impl ErrorType for MemFs {
        type Error = ErrorKind;
    }

    impl Filesystem for MemFs {
        type Entry = MemEntry;

        fn mount_point(&self) -> &str {
            self.mount
        }

        fn list_dir(&mut self, path: &str) -> Result<Vec<MemEntry>, ErrorKind> {
            if self.removable && !self.mounted {
                return Err(ErrorKind::NotConnected);
            }
            if self.fail_list {
                return Err(ErrorKind::Other);
            }
            match (path, &self.apps) {
                (APPS_DIR, Some(apps)) => Ok(apps.clone()),
                ("/", _) => Ok(vec![]),
                _ => Err(ErrorKind::NotFound),
            }
        }

        fn exists(&mut self, path: &str) -> Result<bool, ErrorKind> {
            if self.removable && !self.mounted {
                return Err(ErrorKind::NotConnected);
            }
            Ok(path == APPS_DIR && self.apps.is_some())
        }

        fn create_dir(&mut self, path: &str) -> Result<(), ErrorKind> {
            if self.fail_create || path != APPS_DIR {
                return Err(ErrorKind::PermissionDenied);
            }
            self.apps = Some(Vec::new());
            Ok(())
        }
    }

    impl RemovableFilesystem for MemFs {
        fn is_mounted(&self) -> bool {
            self.mounted
        }

        fn mount(&mut self) -> Result<(), ErrorKind> {
            if self.fail_mount {
                return Err(ErrorKind::NotFound);
            }
            self.mounted = true;
            Ok(())
        }

        fn release(&mut self) -> Result<(), ErrorKind> {
            self.mounted = false;
            self.releases += 1;
            if self.fail_release {
                return Err(ErrorKind::Other);
            }
            self.log.push("card.release");
            Ok(())
        }
    }
}
