//! Machine profiles and their JSON store
//!
//! A profile keeps the raw probe-sample string exactly as probed. Everything
//! derived from it is recomputed by [`MachineProfile::determined_height_info`],
//! so replacing the samples can never leave a stale grid behind.

use crate::error::{ProfileError, ProfileResult};
use crate::info::DeterminedHeightInfo;
use crate::limits::MachineLimits;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MachineProfile {
    pub id: String,
    pub name: String,
    pub limits: MachineLimits,
    /// Raw JSON sample list as produced by a probing run
    pub height_info: Option<String>,
    pub height_info_updated_at: Option<DateTime<Utc>>,
}

impl Default for MachineProfile {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "New Machine".to_string(),
            limits: MachineLimits::default(),
            height_info: None,
            height_info_updated_at: None,
        }
    }
}

impl MachineProfile {
    pub fn new(name: impl Into<String>, limits: MachineLimits) -> Self {
        Self {
            name: name.into(),
            limits,
            ..Self::default()
        }
    }

    /// Replace the raw samples and stamp the update time
    pub fn set_height_info(&mut self, samples_json: impl Into<String>) {
        self.height_info = Some(samples_json.into());
        self.height_info_updated_at = Some(Utc::now());
    }

    pub fn clear_height_info(&mut self) {
        self.height_info = None;
        self.height_info_updated_at = Some(Utc::now());
    }

    /// Derive height info against this profile's limits
    ///
    /// `Ok(None)` when the profile has no samples yet.
    pub fn determined_height_info(&self) -> ProfileResult<Option<DeterminedHeightInfo>> {
        match self.height_info.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(DeterminedHeightInfo::determine(
                raw,
                Some(&self.limits),
            )?)),
            _ => Ok(None),
        }
    }

    pub fn validate(&self) -> ProfileResult<()> {
        if self.id.trim().is_empty() {
            return Err(ProfileError::MissingField("id".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(ProfileError::MissingField("name".to_string()));
        }
        if let Some(axis) = self.limits.inverted_axes().first() {
            return Err(ProfileError::InvalidAxisLimit {
                axis: axis.to_string(),
                reason: "min greater than max".to_string(),
            });
        }
        Ok(())
    }
}

/// Profiles persisted as a pretty-printed JSON array
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: Vec<MachineProfile>,
}

impl ProfileStore {
    /// Open the store at `path`, starting empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> ProfileResult<Self> {
        let path = path.into();
        let profiles = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };
        tracing::debug!("Loaded {} machine profiles from {:?}", profiles.len(), path);
        Ok(Self { path, profiles })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profiles(&self) -> &[MachineProfile] {
        &self.profiles
    }

    pub fn get(&self, id: &str) -> Option<&MachineProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Insert or replace by id, then persist
    pub fn upsert(&mut self, profile: MachineProfile) -> ProfileResult<()> {
        profile.validate()?;
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
        self.save()
    }

    pub fn remove(&mut self, id: &str) -> ProfileResult<MachineProfile> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ProfileError::ProfileNotFound(id.to_string()))?;
        let removed = self.profiles.remove(index);
        self.save()?;
        Ok(removed)
    }

    /// Store fresh samples on a profile
    ///
    /// The samples are checked to form a grid first, so a bad probe result
    /// never replaces a good one.
    pub fn update_height_info(&mut self, id: &str, samples_json: &str) -> ProfileResult<()> {
        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ProfileError::ProfileNotFound(id.to_string()))?;

        DeterminedHeightInfo::determine(samples_json, Some(&profile.limits))?;
        profile.set_height_info(samples_json);
        tracing::info!("Updated height info for machine '{}'", profile.name);
        self.save()
    }

    fn save(&self) -> ProfileResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.profiles)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
