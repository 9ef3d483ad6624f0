//! Application catalog: the ordered menu the launcher scrolls through.
//!
//! A scan lists the `apps` directory of internal flash and then of the
//! removable card, keeps files with a recognised suffix, sorts the names
//! case-insensitively and appends the fixed synthetic entries.
//!
//! Duplicate names resolve last-write-wins: the card is scanned after flash,
//! so a card entry replaces the flash path. The name keeps the list slot it
//! was first given, which after sorting is indistinguishable from any other
//! slot for the same name.

extern crate alloc;

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};
use log::{info, warn};

use crate::fs::{self, Filesystem, RemovableFilesystem};

/// Recognised application suffixes: source and precompiled.
pub const APP_SUFFIXES: [&str; 2] = [".py", ".mpy"];

/// Path handed off when the `Settings` entry is activated.
pub const SETTINGS_PATH: &str = "/launcher/settings.py";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Flash,
    Card,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppEntry {
    pub name: String,
    pub path: String,
    pub origin: Origin,
}

/// In-launcher actions listed after the applications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Reload,
    ToggleSound,
    OpenSettings,
}

impl Action {
    /// Synthetic entries in menu order.
    pub const ALL: [Action; 3] = [Action::Reload, Action::ToggleSound, Action::OpenSettings];

    pub const fn label(self) -> &'static str {
        match self {
            Action::Reload => "Reload Apps",
            Action::ToggleSound => "UI Sound",
            Action::OpenSettings => "Settings",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItem<'a> {
    App(&'a AppEntry),
    Action(Action),
}

impl MenuItem<'_> {
    pub fn label(&self) -> &str {
        match self {
            MenuItem::App(entry) => entry.name.as_str(),
            MenuItem::Action(action) => action.label(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    names: Vec<String>,
    apps: BTreeMap<String, AppEntry>,
}

impl Catalog {
    /// A catalog holding only the synthetic entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of menu entries, synthetic ones included. Never below 3.
    pub fn len(&self) -> usize {
        self.names.len() + Action::ALL.len()
    }

    /// Always false: the synthetic entries are permanent.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn app_count(&self) -> usize {
        self.names.len()
    }

    pub fn item(&self, index: usize) -> Option<MenuItem<'_>> {
        if let Some(name) = self.names.get(index) {
            return self.apps.get(name).map(MenuItem::App);
        }
        Action::ALL
            .get(index - self.names.len())
            .copied()
            .map(MenuItem::Action)
    }

    pub fn label(&self, index: usize) -> &str {
        match self.names.get(index) {
            Some(name) => name.as_str(),
            None => Action::ALL
                .get(index - self.names.len())
                .map_or("", |action| action.label()),
        }
    }

    /// Menu labels in order, synthetic entries last.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .map(String::as_str)
            .chain(Action::ALL.iter().map(|action| action.label()))
    }

    pub fn app(&self, name: &str) -> Option<&AppEntry> {
        self.apps.get(name)
    }

    /// Index of the first entry whose label starts with `prefix`, ignoring case.
    pub fn find_prefix(&self, prefix: char) -> Option<usize> {
        let mut buf = [0u8; 4];
        let wanted = prefix.to_lowercase().next()?.encode_utf8(&mut buf);
        self.labels()
            .position(|label| label.to_lowercase().starts_with(&*wanted))
    }

    /// Records a discovered file. Returns `false` when the name lacks a
    /// recognised suffix.
    fn insert(&mut self, file_name: &str, apps_path: &str, origin: Origin) -> bool {
        let Some(name) = strip_app_suffix(file_name) else {
            return false;
        };
        if !self.apps.contains_key(name) {
            self.names.push(name.to_string());
        }
        let mut path = String::from(apps_path);
        path.push('/');
        path.push_str(file_name);
        self.apps.insert(
            name.to_string(),
            AppEntry {
                name: name.to_string(),
                path,
                origin,
            },
        );
        true
    }

    fn sort(&mut self) {
        // `sort_by_cached_key` is stable, so equal keys keep discovery order.
        self.names.sort_by_cached_key(|name| name.to_lowercase());
    }
}

pub fn strip_app_suffix(file_name: &str) -> Option<&str> {
    APP_SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .filter(|name| !name.is_empty())
}

/// Builds a fresh catalog from both roots. Every storage failure is logged
/// and skipped, so the result always has at least the synthetic entries.
pub fn scan<F, R>(flash: &mut F, card: &mut R) -> Catalog
where
    F: Filesystem,
    R: RemovableFilesystem,
{
    let mut catalog = Catalog::new();

    let flash_root = fs::ensure_apps_dir(flash);
    if flash_root.apps_ready {
        match fs::list_apps(flash) {
            Ok(files) => {
                let apps_path = flash_root.apps_path();
                for file in &files {
                    catalog.insert(file, &apps_path, Origin::Flash);
                }
            }
            Err(err) => warn!("Could not list {}: {:?}", flash_root.apps_path(), err),
        }
    }

    let card_present = fs::ensure_mounted(card);
    if card_present {
        let card_root = fs::ensure_apps_dir(card);
        if card_root.apps_ready {
            match fs::list_apps(card) {
                Ok(files) => {
                    let apps_path = card_root.apps_path();
                    for file in &files {
                        catalog.insert(file, &apps_path, Origin::Card);
                    }
                }
                Err(err) => {
                    warn!(
                        "Card mounted but {} unreadable, assuming it was removed: {:?}",
                        card_root.apps_path(),
                        err
                    );
                    if let Err(err) = card.release() {
                        warn!("Could not release card: {:?}", err);
                    }
                }
            }
        }
    }

    catalog.sort();
    info!(
        "Catalog scanned: {} apps, card {}",
        catalog.app_count(),
        if card.is_mounted() { "mounted" } else { "absent" }
    );
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::*;

    fn labels(catalog: &Catalog) -> Vec<&str> {
        catalog.labels().collect()
    }

    #[test]
    fn test_empty_storage_has_synthetic_entries() {
        let mut flash = MemFs::flash(&[]);
        let mut card = MemFs::no_card();
        let catalog = scan(&mut flash, &mut card);
        assert_eq!(catalog.len(), 3);
        assert_eq!(labels(&catalog), ["Reload Apps", "UI Sound", "Settings"]);
    }

    #[test]
    fn test_flash_apps_without_card() {
        let mut flash = MemFs::flash(&["Clock.mpy", "Chess.py"]);
        let mut card = MemFs::no_card();
        let catalog = scan(&mut flash, &mut card);
        assert_eq!(
            labels(&catalog),
            ["Chess", "Clock", "Reload Apps", "UI Sound", "Settings"]
        );
        assert_eq!(catalog.app("Clock").unwrap().path, "/apps/Clock.mpy");
    }

    #[test]
    fn test_sort_ignores_case() {
        let mut flash = MemFs::flash(&["Zen.py", "apple.py"]);
        let mut card = MemFs::no_card();
        let catalog = scan(&mut flash, &mut card);
        assert_eq!(catalog.label(0), "apple");
        assert_eq!(catalog.label(1), "Zen");
    }

    #[test]
    fn test_case_only_differences_keep_discovery_order() {
        let mut flash = MemFs::flash(&["banana.py", "apple.py", "Apple.py", "APPLE.mpy"]);
        let mut card = MemFs::no_card();
        let catalog = scan(&mut flash, &mut card);
        assert_eq!(
            labels(&catalog)[..4],
            ["apple", "Apple", "APPLE", "banana"]
        );
        assert_eq!(catalog.find_prefix('a'), Some(0));
        assert_eq!(catalog.find_prefix('A'), Some(0));
    }

    #[test]
    fn test_card_duplicate_overrides_flash_path() {
        let mut flash = MemFs::flash(&["Snake.py", "Tetris.py"]);
        let mut card = MemFs::card(&["Snake.mpy"]);
        let catalog = scan(&mut flash, &mut card);

        assert_eq!(catalog.app_count(), 2);
        let snake = catalog.app("Snake").unwrap();
        assert_eq!(snake.path, "/sd/apps/Snake.mpy");
        assert_eq!(snake.origin, Origin::Card);
        // The duplicate keeps a single slot in the menu.
        assert_eq!(labels(&catalog).iter().filter(|l| **l == "Snake").count(), 1);
    }

    #[test]
    fn test_unrecognised_files_are_ignored() {
        let mut flash = MemFs::flash(&["notes.txt", "readme", ".py", "Game.py"]);
        let mut card = MemFs::no_card();
        let catalog = scan(&mut flash, &mut card);
        assert_eq!(catalog.app_count(), 1);
        assert_eq!(catalog.label(0), "Game");
    }

    #[test]
    fn test_card_mounted_during_scan() {
        let mut flash = MemFs::flash(&[]);
        let mut card = MemFs::card(&["Paint.py"]);
        let catalog = scan(&mut flash, &mut card);
        assert!(card.is_mounted());
        assert_eq!(catalog.item(0), Some(MenuItem::App(catalog.app("Paint").unwrap())));
    }

    #[test]
    fn test_unreadable_card_is_released() {
        let mut flash = MemFs::flash(&["A.py"]);
        let mut card = MemFs::card(&["B.py"]);
        card.fail_list = true;
        let catalog = scan(&mut flash, &mut card);
        assert_eq!(catalog.app_count(), 1);
        assert!(!card.is_mounted());
        assert_eq!(card.releases, 1);
    }

    #[test]
    fn test_flash_create_failure_keeps_card_apps() {
        let mut flash = MemFs {
            mount: crate::fs::FLASH_MOUNT,
            apps: None,
            fail_create: true,
            ..MemFs::default()
        };
        let mut card = MemFs::card(&["Radio.py"]);
        let catalog = scan(&mut flash, &mut card);
        assert_eq!(labels(&catalog)[0], "Radio");
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_synthetic_entries_stay_last_after_sort() {
        let mut flash = MemFs::flash(&["zzz.py", "Aardvark.py", "Settings2.py"]);
        let mut card = MemFs::no_card();
        let catalog = scan(&mut flash, &mut card);
        let n = catalog.len();
        assert_eq!(catalog.item(n - 3), Some(MenuItem::Action(Action::Reload)));
        assert_eq!(catalog.item(n - 2), Some(MenuItem::Action(Action::ToggleSound)));
        assert_eq!(catalog.item(n - 1), Some(MenuItem::Action(Action::OpenSettings)));
        assert_eq!(catalog.item(n), None);
    }

    #[test]
    fn test_find_prefix_ignores_case_and_includes_actions() {
        let mut flash = MemFs::flash(&["Chess.py", "clock.py"]);
        let mut card = MemFs::no_card();
        let catalog = scan(&mut flash, &mut card);
        assert_eq!(catalog.find_prefix('c'), Some(0));
        assert_eq!(catalog.find_prefix('C'), Some(0));
        assert_eq!(catalog.find_prefix('u'), Some(3));
        assert_eq!(catalog.find_prefix('x'), None);
    }
}
