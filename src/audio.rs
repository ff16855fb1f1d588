//! Client-local registry of synthesized clips.
//!
//! Each clip is stored under a `blob:` style URL the caller can pass around (to a player,
//! a download route, ...). Clips stay alive until [`AudioStore::release`] is called.

use crate::types::MediaType;
use crate::Result;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Opaque reference to a stored clip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AudioHandle {
    id: Uuid,
    url: String,
}

impl AudioHandle {
    fn new() -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            url: format!("blob:sovits/{}", id),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Audio bytes plus their container format.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub data: Bytes,
    pub format: MediaType,
}

impl AudioClip {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub async fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, &self.data).await?;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct AudioStore {
    clips: Arc<RwLock<HashMap<AudioHandle, AudioClip>>>,
}

impl AudioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, clip: AudioClip) -> AudioHandle {
        let handle = AudioHandle::new();
        self.write().insert(handle.clone(), clip);
        handle
    }

    pub fn get(&self, handle: &AudioHandle) -> Option<AudioClip> {
        self.read().get(handle).cloned()
    }

    /// Look up a clip by its `blob:` URL.
    pub fn get_by_url(&self, url: &str) -> Option<AudioClip> {
        self.read()
            .iter()
            .find(|(h, _)| h.url == url)
            .map(|(_, c)| c.clone())
    }

    /// Drop the clip. Returns false if it was already released.
    pub fn release(&self, handle: &AudioHandle) -> bool {
        self.write().remove(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    // A poisoned lock only means a panic elsewhere mid-insert; the map itself is intact.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<AudioHandle, AudioClip>> {
        self.clips.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<AudioHandle, AudioClip>> {
        self.clips.write().unwrap_or_else(|e| e.into_inner())
    }
}
