use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OverlayError, OverlayResult};
use crate::render::Color;
use crate::rules::DEFAULT_TOLERANCE;
use crate::technique::{CatalogSource, TechniqueKey};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub technique: TechniqueConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// 描画スタイルと判定の許容範囲
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// カタログで個別指定がないルールの許容範囲 (度)
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
    /// 逸脱 0 の色
    #[serde(default = "default_good_color")]
    pub good_color: Color,
    /// 逸脱が許容範囲に達したときの色
    #[serde(default = "default_bad_color")]
    pub bad_color: Color,
    /// ルール対象外の骨格線
    #[serde(default = "default_line_color")]
    pub line_color: Color,
    #[serde(default = "default_point_color")]
    pub point_color: Color,
    #[serde(default = "default_label_color")]
    pub label_color: Color,
    /// 骨格線の太さ (px)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    /// ランドマーク点の直径 (px)
    #[serde(default = "default_point_size")]
    pub point_size: f32,
    /// 角度ラベルの文字サイズ (px)
    #[serde(default = "default_label_size")]
    pub label_size: f32,
}

fn default_tolerance() -> f32 { DEFAULT_TOLERANCE }
fn default_good_color() -> Color { Color::GREEN }
fn default_bad_color() -> Color { Color::RED }
fn default_line_color() -> Color { Color::GREEN }
fn default_point_color() -> Color { Color::YELLOW }
fn default_label_color() -> Color { Color::WHITE }
fn default_stroke_width() -> f32 { 12.0 }
fn default_point_size() -> f32 { 12.0 }
fn default_label_size() -> f32 { 40.0 }

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            good_color: default_good_color(),
            bad_color: default_bad_color(),
            line_color: default_line_color(),
            point_color: default_point_color(),
            label_color: default_label_color(),
            stroke_width: default_stroke_width(),
            point_size: default_point_size(),
            label_size: default_label_size(),
        }
    }
}

impl OverlayConfig {
    pub fn validate(&self) -> OverlayResult<()> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(OverlayError::MalformedRuleConfiguration(format!(
                "overlay.tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        for (name, value) in [
            ("stroke_width", self.stroke_width),
            ("point_size", self.point_size),
            ("label_size", self.label_size),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(OverlayError::MalformedRuleConfiguration(format!(
                    "overlay.{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// 使用する技術
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueConfig {
    #[serde(default = "default_sport")]
    pub sport: String,
    #[serde(default = "default_technique_name")]
    pub name: String,
    /// JSONカタログのパス。未指定なら組み込みカタログ
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

fn default_sport() -> String { "Sprint".to_string() }
fn default_technique_name() -> String { "Technique1".to_string() }

impl Default for TechniqueConfig {
    fn default() -> Self {
        Self {
            sport: default_sport(),
            name: default_technique_name(),
            catalog: None,
        }
    }
}

impl TechniqueConfig {
    pub fn key(&self) -> TechniqueKey {
        TechniqueKey::new(self.sport.clone(), self.name.clone())
    }

    pub fn catalog_source(&self) -> CatalogSource {
        match &self.catalog {
            Some(path) => CatalogSource::File(path.clone()),
            None => CatalogSource::Builtin,
        }
    }
}

/// 記録済みランドマークの再生設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// 1行1フレームの JSON Lines
    #[serde(default = "default_replay_input")]
    pub input: PathBuf,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,
    /// 最終フレームの書き出し先 (PNG)
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default = "default_background_color")]
    pub background_color: Color,
}

fn default_replay_input() -> PathBuf { PathBuf::from("frames.jsonl") }
fn default_viewport_width() -> f32 { 1280.0 }
fn default_viewport_height() -> f32 { 720.0 }
fn default_background_color() -> Color { Color::BLACK }

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input: default_replay_input(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            output: None,
            background_color: default_background_color(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// 読めなければ警告を出してデフォルト値を使う
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using default config", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> OverlayResult<()> {
        self.overlay.validate()
    }
}
