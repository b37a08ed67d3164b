//! Sequence file handling

use anyhow::{Context, Result};
use cadence_animation::{Animator, Easing, FieldMap, Step, Tween, TweenError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Marker labels recorded while a sequence plays, in firing order
pub type MarkerLog = Arc<Mutex<Vec<String>>>;

/// Top-level sequence file (`*.toml`)
#[derive(Debug, Deserialize, Serialize)]
pub struct SequenceFile {
    #[serde(default)]
    pub sequence: SequenceConfig,
    /// Initial values of the animated record
    #[serde(default)]
    pub fields: BTreeMap<String, f32>,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

/// Playback settings
#[derive(Debug, Deserialize, Serialize)]
pub struct SequenceConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default = "default_true")]
    pub start: bool,
}

fn default_name() -> String {
    "sequence".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            looping: false,
            start: true,
        }
    }
}

/// One step of the sequence
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepConfig {
    Tween {
        fields: BTreeMap<String, TweenConfig>,
    },
    Delay {
        duration: f32,
    },
    /// Logs its label and records it in the run report
    Marker {
        label: String,
    },
}

/// One field of a tween step
#[derive(Debug, Deserialize, Serialize)]
pub struct TweenConfig {
    /// Defaults to the value the field holds when this step is reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<f32>,
    pub to: f32,
    pub duration: f32,
    #[serde(default = "default_easing")]
    pub easing: String,
}

fn default_easing() -> String {
    "linear".to_string()
}

impl SequenceFile {
    /// Load and validate a sequence file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "No sequence file at {}. Run `cadence init` to create one.",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SequenceFile = toml::from_str(content)?;
        file.validate()?;
        Ok(file)
    }

    /// Check easing names and durations without building anything
    pub fn validate(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            check_step(step).with_context(|| format!("Invalid step {}", index + 1))?;
        }
        Ok(())
    }

    /// Build an animator over a [`FieldMap`] seeded with `[fields]`.
    ///
    /// Marker steps append their label to `markers` when reached.
    pub fn build(&self, markers: MarkerLog) -> Result<Animator<FieldMap>> {
        self.validate()?;

        // last known value of each field, for tweens without `from`
        let mut current = self.fields.clone();
        let mut steps = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let step = match step {
                StepConfig::Tween { fields } => {
                    let mut tweens = Vec::with_capacity(fields.len());
                    for (name, cfg) in fields {
                        let from = cfg
                            .from
                            .unwrap_or_else(|| current.get(name).copied().unwrap_or(0.0));
                        let easing: Easing = cfg.easing.parse()?;
                        tweens.push((
                            name.clone(),
                            Tween::try_from_to_in(from, cfg.to, cfg.duration, easing)?,
                        ));
                        current.insert(name.clone(), cfg.to);
                    }
                    Step::tween(tweens)
                }
                StepConfig::Delay { duration } => Step::delay(*duration),
                StepConfig::Marker { label } => {
                    let label = label.clone();
                    let markers = markers.clone();
                    Step::callback(move || {
                        tracing::info!(marker = %label, "marker reached");
                        if let Ok(mut log) = markers.lock() {
                            log.push(label.clone());
                        }
                    })
                }
            };
            steps.push(step);
        }

        let target: FieldMap = self.fields.iter().map(|(k, v)| (k.clone(), *v)).collect();
        tracing::debug!(
            name = %self.sequence.name,
            steps = steps.len(),
            looping = self.sequence.looping,
            "built sequence"
        );

        Ok(Animator::new(
            target,
            steps,
            self.sequence.start,
            self.sequence.looping,
        ))
    }

    /// Sample sequence written by `cadence init`
    pub fn sample(name: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("x".to_string(), 0.0);
        fields.insert("alpha".to_string(), 0.0);

        let mut fade_in = BTreeMap::new();
        fade_in.insert(
            "alpha".to_string(),
            TweenConfig {
                from: Some(0.0),
                to: 1.0,
                duration: 0.5,
                easing: "linear".to_string(),
            },
        );
        fade_in.insert(
            "x".to_string(),
            TweenConfig {
                from: None,
                to: 120.0,
                duration: 1.0,
                easing: "rcube".to_string(),
            },
        );

        let mut fade_out = BTreeMap::new();
        fade_out.insert(
            "alpha".to_string(),
            TweenConfig {
                from: None,
                to: 0.0,
                duration: 0.5,
                easing: "cube".to_string(),
            },
        );

        Self {
            sequence: SequenceConfig {
                name: name.to_string(),
                ..Default::default()
            },
            fields,
            steps: vec![
                StepConfig::Tween { fields: fade_in },
                StepConfig::Marker {
                    label: "arrived".to_string(),
                },
                StepConfig::Delay { duration: 0.5 },
                StepConfig::Tween { fields: fade_out },
            ],
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize sequence")
    }
}

fn check_step(step: &StepConfig) -> std::result::Result<(), TweenError> {
    match step {
        StepConfig::Tween { fields } => {
            if fields.is_empty() {
                return Err(TweenError::EmptyTweenStep);
            }
            for cfg in fields.values() {
                cfg.easing.parse::<Easing>()?;
                check_duration(cfg.duration)?;
            }
            Ok(())
        }
        StepConfig::Delay { duration } => check_duration(*duration),
        StepConfig::Marker { .. } => Ok(()),
    }
}

fn check_duration(duration: f32) -> std::result::Result<(), TweenError> {
    if duration.is_finite() && duration >= 0.0 {
        Ok(())
    } else {
        Err(TweenError::InvalidDuration(duration))
    }
}
