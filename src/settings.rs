//! Typed user preferences persisted to a key-value store.
//!
//! Loaded once at startup. Every setter writes through to the store before
//! the in-memory value changes, so a failed write leaves both unchanged.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const KEY_MUTED: &str = "clipfeed.sound.muted";
pub const KEY_VOLUME: &str = "clipfeed.sound.volume";
pub const KEY_DEFAULT_FEED: &str = "clipfeed.feed.default_tab";
pub const KEY_NAV_AUTO_HIDE: &str = "clipfeed.nav.auto_hide";
pub const KEY_UI_MARGIN: &str = "clipfeed.ui.margin";

const ALL_KEYS: [&str; 5] = [
    KEY_MUTED,
    KEY_VOLUME,
    KEY_DEFAULT_FEED,
    KEY_NAV_AUTO_HIDE,
    KEY_UI_MARGIN,
];

/// Error reading or writing settings
#[derive(Debug)]
pub enum SettingsError {
    Io { path: PathBuf, source: std::io::Error },
    Encode(serde_json::Error),
    /// The backing file exists but is not a JSON object of strings
    Corrupt { path: PathBuf, message: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io { path, source } => {
                write!(f, "settings I/O on {}: {}", path.display(), source)
            }
            SettingsError::Encode(e) => write!(f, "settings encode: {}", e),
            SettingsError::Corrupt { path, message } => {
                write!(f, "settings file {} is corrupt: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            SettingsError::Encode(e) => Some(e),
            SettingsError::Corrupt { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Encode(e)
    }
}

/// String key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        (**self).remove(key)
    }
}

/// In-process store, lost on exit.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by one JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| SettingsError::Corrupt {
                path: path.clone(),
                message: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        log::debug!("settings store {} opened ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, text).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            match previous {
                Some(v) => self.entries.insert(key.to_string(), v),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        if let Some(previous) = self.entries.remove(key) {
            if let Err(e) = self.flush() {
                self.entries.insert(key.to_string(), previous);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Feed tab opened at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedTab {
    #[default]
    ForYou,
    Following,
}

impl FeedTab {
    pub fn label(&self) -> &'static str {
        match self {
            FeedTab::ForYou => "For You",
            FeedTab::Following => "Following",
        }
    }
}

/// Outer margin around the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl MarginSize {
    pub fn pixels(&self) -> f32 {
        match self {
            MarginSize::Small => 4.0,
            MarginSize::Medium => 8.0,
            MarginSize::Large => 16.0,
        }
    }
}

pub const DEFAULT_VOLUME: f32 = 0.8;

/// User preferences, written through to `S` on every change.
#[derive(Debug)]
pub struct Settings<S: KeyValueStore> {
    store: S,
    muted: bool,
    volume: f32,
    default_feed: FeedTab,
    nav_auto_hide: bool,
    ui_margin: MarginSize,
}

impl<S: KeyValueStore> Settings<S> {
    /// Read every key once. Malformed values fall back to their defaults.
    pub fn load(store: S) -> Result<Self, SettingsError> {
        let muted = read_or(&store, KEY_MUTED, false)?;
        let volume: f32 = read_or(&store, KEY_VOLUME, DEFAULT_VOLUME)?;
        let default_feed = read_or(&store, KEY_DEFAULT_FEED, FeedTab::default())?;
        let nav_auto_hide = read_or(&store, KEY_NAV_AUTO_HIDE, true)?;
        let ui_margin = read_or(&store, KEY_UI_MARGIN, MarginSize::default())?;

        Ok(Self {
            store,
            muted,
            volume: clamp_volume(volume),
            default_feed,
            nav_auto_hide,
            ui_margin,
        })
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Volume actually applied to playback.
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn default_feed(&self) -> FeedTab {
        self.default_feed
    }

    pub fn nav_auto_hide(&self) -> bool {
        self.nav_auto_hide
    }

    pub fn ui_margin(&self) -> MarginSize {
        self.ui_margin
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<(), SettingsError> {
        write(&mut self.store, KEY_MUTED, &muted)?;
        self.muted = muted;
        Ok(())
    }

    pub fn toggle_muted(&mut self) -> Result<bool, SettingsError> {
        self.set_muted(!self.muted)?;
        Ok(self.muted)
    }

    /// Clamped to [0, 1]. Non-finite input is ignored.
    pub fn set_volume(&mut self, volume: f32) -> Result<(), SettingsError> {
        if !volume.is_finite() {
            return Ok(());
        }
        let volume = clamp_volume(volume);
        write(&mut self.store, KEY_VOLUME, &volume)?;
        self.volume = volume;
        Ok(())
    }

    pub fn set_default_feed(&mut self, tab: FeedTab) -> Result<(), SettingsError> {
        write(&mut self.store, KEY_DEFAULT_FEED, &tab)?;
        self.default_feed = tab;
        Ok(())
    }

    pub fn set_nav_auto_hide(&mut self, auto_hide: bool) -> Result<(), SettingsError> {
        write(&mut self.store, KEY_NAV_AUTO_HIDE, &auto_hide)?;
        self.nav_auto_hide = auto_hide;
        Ok(())
    }

    pub fn set_ui_margin(&mut self, margin: MarginSize) -> Result<(), SettingsError> {
        write(&mut self.store, KEY_UI_MARGIN, &margin)?;
        self.ui_margin = margin;
        Ok(())
    }

    /// Remove every persisted key and restore defaults.
    pub fn reset(&mut self) -> Result<(), SettingsError> {
        for key in ALL_KEYS {
            self.store.remove(key)?;
        }
        self.muted = false;
        self.volume = DEFAULT_VOLUME;
        self.default_feed = FeedTab::default();
        self.nav_auto_hide = true;
        self.ui_margin = MarginSize::default();
        log::info!("settings reset to defaults");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        DEFAULT_VOLUME
    }
}

fn read_or<S, T>(store: &S, key: &str, default: T) -> Result<T, SettingsError>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    match store.get(key)? {
        None => Ok(default),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("ignoring malformed setting {}={:?}: {}", key, raw, e);
                Ok(default)
            }
        },
    }
}

fn write<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), SettingsError>
where
    S: KeyValueStore,
    T: Serialize,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
