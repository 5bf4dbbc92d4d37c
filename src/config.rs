use std::{env, ffi::OsString, fs, path::PathBuf, time::Duration};

use glyph_cache::Retention;
use glyph_model::{CharIndex, LATENT_DIM};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{ConfigErr, Embedding, embedding::LATENT_RANGE};

/// Names the JSON file the configuration is read from.
pub const CONFIG_VAR: &str = "FONT_CONFIG";
/// Overrides `checkpoint`.
pub const CHECKPOINT_VAR: &str = "CHECKPOINT";
/// Overrides `out_dir`.
pub const OUT_DIR_VAR: &str = "OUT_DIR";

/// Settings of the glyph explorer, every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// The `.safetensors` checkpoint with the trained network.
    pub checkpoint: PathBuf,
    /// Where rendered glyphs are written.
    pub out_dir: PathBuf,
    /// The glyphs to render.
    pub characters: String,
    /// A fixed style, a random one seeded with `seed` is used when missing.
    pub embedding: Option<Vec<f32>>,
    pub seed: u64,
    /// How long results are served from the cache, `0` evicts them on delivery.
    pub retention_ms: u64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            checkpoint: PathBuf::from("model.safetensors"),
            out_dir: PathBuf::from("glyphs"),
            characters: CharIndex::new().iter().map(|(c, _)| c).collect(),
            embedding: None,
            seed: 0,
            retention_ms: 0,
        }
    }
}

impl FontConfig {
    /// Reads the configuration from the process environment.
    ///
    /// The file named by `FONT_CONFIG` is parsed if present, then `CHECKPOINT`
    /// and `OUT_DIR` override the matching fields.
    pub fn from_env() -> Result<Self, ConfigErr> {
        let config = match env::var_os(CONFIG_VAR) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let config = config.with_overrides(|var| env::var_os(var));
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: Into<PathBuf>>(path: P) -> Result<Self, ConfigErr> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|source| ConfigErr::Io {
            path: path.clone(),
            source,
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigErr> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies the environment overrides looked up through `var`.
    pub fn with_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(checkpoint) = var(CHECKPOINT_VAR) {
            self.checkpoint = checkpoint.into();
        }
        if let Some(out_dir) = var(OUT_DIR_VAR) {
            self.out_dir = out_dir.into();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigErr> {
        if self.characters.is_empty() {
            return Err(ConfigErr::Invalid("characters must not be empty".into()));
        }

        let index = CharIndex::new();
        if let Some(c) = self.characters.chars().find(|&c| index.id_of(c).is_err()) {
            return Err(ConfigErr::Invalid(format!("unsupported character {c:?}")));
        }

        if let Some(embedding) = &self.embedding {
            if embedding.len() != LATENT_DIM {
                return Err(ConfigErr::Invalid(format!(
                    "embedding has {} values, expected {LATENT_DIM}",
                    embedding.len()
                )));
            }
            if embedding.iter().any(|v| !v.is_finite()) {
                return Err(ConfigErr::Invalid("embedding values must be finite".into()));
            }
        }

        Ok(())
    }

    pub fn retention(&self) -> Retention {
        match self.retention_ms {
            0 => Retention::Evict,
            ms => Retention::For(Duration::from_millis(ms)),
        }
    }

    /// The style glyphs are rendered with.
    pub fn embedding(&self) -> Embedding {
        match &self.embedding {
            Some(values) => Embedding::new(values.clone()),
            None => Embedding::random(&mut StdRng::seed_from_u64(self.seed), LATENT_RANGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_glyph() {
        let config = FontConfig::default();

        assert_eq!(config.characters.chars().count(), glyph_model::NUM_CHARS);
        assert_eq!(config.retention(), Retention::Evict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = FontConfig::from_json(r#"{ "characters": "Hamburgefonstiv", "retention_ms": 250 }"#)
            .unwrap();

        assert_eq!(config.characters, "Hamburgefonstiv");
        assert_eq!(config.retention(), Retention::For(Duration::from_millis(250)));
        assert_eq!(config.checkpoint, FontConfig::default().checkpoint);
    }

    #[test]
    fn rejects_bad_configs() {
        for json in [
            r#"{ "characters": "" }"#,
            r#"{ "characters": "ab!" }"#,
            r#"{ "embedding": [0.1, 0.2] }"#,
        ] {
            let err = FontConfig::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigErr::Invalid(_)), "{json} was accepted");
        }

        let err = FontConfig::from_json(r#"{ "font": "serif" }"#).unwrap_err();
        assert!(matches!(err, ConfigErr::Parse(_)));
    }

    #[test]
    fn environment_overrides_paths() {
        let config = FontConfig::default().with_overrides(|var| match var {
            CHECKPOINT_VAR => Some("/models/glyphs.safetensors".into()),
            _ => None,
        });

        assert_eq!(config.checkpoint, PathBuf::from("/models/glyphs.safetensors"));
        assert_eq!(config.out_dir, FontConfig::default().out_dir);
    }

    #[test]
    fn embedding_follows_the_seed() {
        let config = FontConfig {
            seed: 42,
            ..FontConfig::default()
        };
        assert_eq!(config.embedding(), config.embedding());
        assert_ne!(config.embedding(), FontConfig::default().embedding());

        let fixed = FontConfig {
            embedding: Some(vec![0.5; LATENT_DIM]),
            ..FontConfig::default()
        };
        assert_eq!(fixed.embedding().into_inner(), vec![0.5; LATENT_DIM]);
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = FontConfig::from_file("/nonexistent/font.json").unwrap_err();
        assert!(matches!(err, ConfigErr::Io { ref path, .. } if path.ends_with("font.json")));
    }
}
