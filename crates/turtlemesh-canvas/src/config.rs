use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::error::CanvasError;

/// L-system configuration consumed by the external string-rewriting
/// expander, plus the few keys the coordinator reads directly for the
/// turtle's initial cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct LSystemConfig {
    pub axiom: String,
    pub iterations: u32,
    pub angle_deg: i32,
    pub step: f32,
    pub start_x: f32,
    pub start_y: f32,
    pub rules: HashMap<char, String>,
}

impl Default for LSystemConfig {
    fn default() -> Self {
        Self {
            axiom: String::new(),
            iterations: 0,
            angle_deg: 90,
            step: 1.0,
            start_x: 0.0,
            start_y: 0.0,
            rules: HashMap::new(),
        }
    }
}

impl LSystemConfig {
    pub fn load(path: &Path) -> Result<Self, CanvasError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CanvasError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&contents))
    }

    /// Parse the `key: value` config grammar. Unknown keys
    /// are ignored; malformed lines are ignored with a warning, never
    /// a hard error — the file format has no schema to violate.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                warn!(line, "ignoring config line with no ':'");
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "axiom" => config.axiom = value.to_string(),
                "iterations" => match value.parse() {
                    Ok(n) => config.iterations = n,
                    Err(_) => warn!(value, "ignoring malformed iterations"),
                },
                "angle" => match value.parse() {
                    Ok(n) => config.angle_deg = n,
                    Err(_) => warn!(value, "ignoring malformed angle"),
                },
                "step" => match value.parse() {
                    Ok(n) => config.step = n,
                    Err(_) => warn!(value, "ignoring malformed step"),
                },
                "start_x" => match value.parse() {
                    Ok(n) => config.start_x = n,
                    Err(_) => warn!(value, "ignoring malformed start_x"),
                },
                "start_y" => match value.parse() {
                    Ok(n) => config.start_y = n,
                    Err(_) => warn!(value, "ignoring malformed start_y"),
                },
                "rule" => match value.split_once('=') {
                    Some((symbol, replacement)) if symbol.trim().chars().count() == 1 => {
                        let symbol = symbol.trim().chars().next().unwrap();
                        config.rules.insert(symbol, replacement.trim().to_string());
                    }
                    _ => warn!(value, "ignoring malformed rule"),
                },
                other => warn!(key = other, "ignoring unknown config key"),
            }
        }
        config
    }
}
