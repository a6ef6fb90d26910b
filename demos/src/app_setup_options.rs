use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy_telekinesis::prelude::*;
use bevy_telekinesis::TkConfigError;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Resource, Debug, Parser, Clone)]
pub struct AppSetupConfiguration {
    #[arg(long = "schedule", default_value_t = ScheduleToUse::FixedUpdate)]
    pub schedule_to_use: ScheduleToUse,
    /// A RON file with `locomotion`, `telekinesis` and `anchor` sections. Missing sections and
    /// fields keep their defaults.
    #[arg(long = "config")]
    pub config_path: Option<PathBuf>,
}

impl AppSetupConfiguration {
    pub fn from_environment() -> Self {
        Self::parse()
    }

    /// Load the tuning from `--config`, falling back to the defaults (with an error in the log)
    /// if it cannot be used.
    pub fn load_tuning(&self) -> DemoTuning {
        let Some(path) = self.config_path.as_ref() else {
            return DemoTuning::default();
        };
        match DemoTuning::load(path) {
            Ok(tuning) => {
                info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(err) => {
                error!("{err} - using the default tuning");
                DemoTuning::default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, ValueEnum)]
pub enum ScheduleToUse {
    Update,
    FixedUpdate,
}

impl std::fmt::Display for ScheduleToUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Update => "update",
            Self::FixedUpdate => "fixed-update",
        })
    }
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoTuning {
    pub locomotion: TkLocomotionConfig,
    pub telekinesis: TkTelekinesisConfig,
    pub anchor: TkAnchorConfig,
}

#[derive(thiserror::Error, Debug)]
pub enum TuningLoadError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid tuning in {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: TkConfigError,
    },
}

impl DemoTuning {
    pub fn load(path: &Path) -> Result<Self, TuningLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| TuningLoadError::Read {
            path: path.to_owned(),
            source,
        })?;
        let tuning: Self = ron::from_str(&text).map_err(|source| TuningLoadError::Parse {
            path: path.to_owned(),
            source,
        })?;
        tuning.validate().map_err(|source| TuningLoadError::Invalid {
            path: path.to_owned(),
            source,
        })?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TkConfigError> {
        self.locomotion.validate()?;
        self.telekinesis.validate()?;
        self.anchor.validate()
    }
}
