use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Number of directional shadow cascades the frame pipeline culls for.
pub const SHADOW_CASCADES: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read render settings from {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse render settings from {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub draw_submission: DrawSubmission,
    #[serde(default = "RenderSettings::default_true")]
    pub better_depth_batching: bool,
    #[serde(default = "RenderSettings::default_true")]
    pub collapse_shadow_commands: bool,
    /// Zero selects the hardware-derived default.
    #[serde(default)]
    pub worker_threads: usize,
    #[serde(default)]
    pub synchronous_jobs: bool,
    #[serde(default)]
    pub depth_prepass_all: bool,
    #[serde(default = "RenderSettings::default_scratch_arena_words")]
    pub scratch_arena_words: usize,
    #[serde(default = "RenderSettings::default_bone_buffer_matrices")]
    pub bone_buffer_matrices: usize,
    #[serde(default = "RenderSettings::default_transparent_sort_distance")]
    pub transparent_sort_distance: f32,
    #[serde(default = "RenderSettings::default_shadow_cascades")]
    pub shadow_cascades: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            draw_submission: DrawSubmission::default(),
            better_depth_batching: true,
            collapse_shadow_commands: true,
            worker_threads: 0,
            synchronous_jobs: false,
            depth_prepass_all: false,
            scratch_arena_words: Self::default_scratch_arena_words(),
            bone_buffer_matrices: Self::default_bone_buffer_matrices(),
            transparent_sort_distance: Self::default_transparent_sort_distance(),
            shadow_cascades: Self::default_shadow_cascades(),
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        Self::load_from_path("render_settings.json")
    }

    /// Loads settings, falling back to defaults when the file is missing or
    /// malformed.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_path(path) {
            Ok(settings) => {
                info!("Loaded render settings from {:?}", path);
                settings
            }
            Err(SettingsError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!("{}. Falling back to default render settings.", err);
                RenderSettings::default()
            }
        }
    }

    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RenderSettings>(contents).map(RenderSettings::validate)
    }

    fn validate(mut self) -> Self {
        if self.scratch_arena_words == 0 {
            warn!("Scratch arena must hold at least one word. Using default size.");
            self.scratch_arena_words = Self::default_scratch_arena_words();
        }

        if self.bone_buffer_matrices == 0 {
            warn!("Bone buffer must hold at least one matrix. Using default size.");
            self.bone_buffer_matrices = Self::default_bone_buffer_matrices();
        }

        if !(self.transparent_sort_distance.is_finite() && self.transparent_sort_distance > 0.0) {
            warn!("Transparent sort distance must be positive. Using default value.");
            self.transparent_sort_distance = Self::default_transparent_sort_distance();
        }

        if self.shadow_cascades != SHADOW_CASCADES {
            warn!(
                "Only {} shadow cascades are supported. Ignoring {}.",
                SHADOW_CASCADES, self.shadow_cascades
            );
            self.shadow_cascades = SHADOW_CASCADES;
        }

        self
    }

    const fn default_true() -> bool {
        true
    }

    const fn default_scratch_arena_words() -> usize {
        4 * 1024 * 1024
    }

    const fn default_bone_buffer_matrices() -> usize {
        16 * 1024
    }

    const fn default_transparent_sort_distance() -> f32 {
        1000.0
    }

    const fn default_shadow_cascades() -> usize {
        SHADOW_CASCADES
    }
}

/// How compiled draw lists are handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawSubmission {
    /// One multi-draw-indirect call per multidraw batch.
    #[default]
    Indirect,
    /// One draw call per surviving instance, for backends without indirect
    /// draws.
    Discrete,
}
