use std::path::PathBuf;

use winit::dpi::LogicalSize;

use pixelpen_engine::window::RuntimeConfig;

/// Overrides the font search list with a single file.
pub const ENV_FONT: &str = "PIXELPEN_FONT";
/// Overrides the sprite sheet path.
pub const ENV_SPRITESHEET: &str = "PIXELPEN_SPRITESHEET";
/// Overrides the world camera zoom (pixels per world unit).
pub const ENV_ZOOM: &str = "PIXELPEN_ZOOM";

/// System fonts tried in order when no font is configured.
const FONT_CANDIDATES: [&str; 5] = [
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
];

/// Everything the demo needs to know before the window opens.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,

    /// Font files tried in order; the first readable one wins.
    pub font_paths: Vec<PathBuf>,
    pub spritesheet: PathBuf,

    pub zoom: f32,
    /// Sprite speed in world units per second.
    pub sprite_speed: f32,
    pub text_scale: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "pixelpen".to_string(),
            width: 1920.0,
            height: 1080.0,
            font_paths: FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
            spritesheet: PathBuf::from("assets/textures/spritesheet.png"),
            zoom: 500.0,
            sprite_speed: 1.0,
            text_scale: 1.0,
        }
    }
}

impl DemoConfig {
    /// Defaults with `PIXELPEN_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides taken from `lookup` (key → value).
    ///
    /// Empty values are ignored; an unparsable or non-positive zoom is
    /// logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(font) = get(ENV_FONT) {
            config.font_paths = vec![PathBuf::from(font)];
        }
        if let Some(sheet) = get(ENV_SPRITESHEET) {
            config.spritesheet = PathBuf::from(sheet);
        }
        if let Some(raw) = get(ENV_ZOOM) {
            match raw.trim().parse::<f32>() {
                Ok(zoom) if zoom.is_finite() && zoom > 0.0 => config.zoom = zoom,
                _ => log::warn!("ignoring {ENV_ZOOM}={raw:?}: expected a positive number"),
            }
        }

        config
    }

    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.width, self.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = DemoConfig::from_lookup(lookup(&[]));
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.zoom, 500.0);
        assert_eq!(config.font_paths.len(), FONT_CANDIDATES.len());
    }

    #[test]
    fn font_override_replaces_search_list() {
        let config = DemoConfig::from_lookup(lookup(&[(ENV_FONT, "/tmp/mono.ttf")]));
        assert_eq!(config.font_paths, vec![PathBuf::from("/tmp/mono.ttf")]);
    }

    #[test]
    fn sheet_and_zoom_overrides() {
        let config = DemoConfig::from_lookup(lookup(&[
            (ENV_SPRITESHEET, "sheet.png"),
            (ENV_ZOOM, " 250 "),
        ]));
        assert_eq!(config.spritesheet, PathBuf::from("sheet.png"));
        assert_eq!(config.zoom, 250.0);
    }

    #[test]
    fn bad_zoom_keeps_default() {
        for raw in ["abc", "0", "-3", "NaN"] {
            let config = DemoConfig::from_lookup(lookup(&[(ENV_ZOOM, raw)]));
            assert_eq!(config.zoom, 500.0, "zoom {raw:?}");
        }
    }

    #[test]
    fn empty_values_are_ignored() {
        let config = DemoConfig::from_lookup(lookup(&[(ENV_FONT, ""), (ENV_SPRITESHEET, "  ")]));
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn runtime_config_carries_title_and_size() {
        let rc = DemoConfig::default().runtime();
        assert_eq!(rc.title, "pixelpen");
        assert_eq!(rc.initial_size, LogicalSize::new(1920.0, 1080.0));
    }
}
