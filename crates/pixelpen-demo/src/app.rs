use anyhow::{bail, Context, Result};

use pixelpen_engine::core::{App, AppControl, FrameCtx};
use pixelpen_engine::device::Gpu;
use pixelpen_engine::input::Key;
use pixelpen_engine::paint::Color;
use pixelpen_engine::render::{SpriteRenderer, TextRenderer, Texture, WorldCamera};
use pixelpen_engine::sprite::{SpriteGeometry, SpriteInstanceSet, Transform};
use pixelpen_engine::text::{FontLoadError, GlyphAtlas};

use crate::config::DemoConfig;

const HELP_TEXT: &str = "W A S D  move\nEsc  quit";

/// Loads the first readable font from the configured search list.
///
/// Missing files are skipped; a file that exists but fails to parse is fatal.
pub fn load_atlas(config: &DemoConfig) -> Result<GlyphAtlas> {
    for path in &config.font_paths {
        match GlyphAtlas::load_file(path) {
            Ok(atlas) => {
                log::info!("using font {}", path.display());
                return Ok(atlas);
            }
            Err(FontLoadError::Io { path, source }) => {
                log::debug!("font {} not usable: {source}", path.display());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("loading font {}", path.display()));
            }
        }
    }
    bail!(
        "no usable font found (tried {} paths); set PIXELPEN_FONT to a .ttf file",
        config.font_paths.len()
    )
}

struct Renderers {
    sprite: SpriteRenderer,
    text: TextRenderer,
}

/// Demo state: atlas, the player sprite, the camera and the GPU renderers.
pub struct DemoApp {
    config: DemoConfig,
    atlas: GlyphAtlas,
    sprite: SpriteInstanceSet,
    camera: WorldCamera,
    clear: Color,

    // Created in `on_init` once the device exists.
    renderers: Option<Renderers>,
}

impl DemoApp {
    pub fn new(config: DemoConfig, atlas: GlyphAtlas) -> Self {
        let sprite = SpriteInstanceSet::new(
            SpriteGeometry::default(),
            Transform::default(),
            config.sprite_speed,
        );
        let camera = WorldCamera { zoom: config.zoom, ..WorldCamera::default() };

        Self {
            config,
            atlas,
            sprite,
            camera,
            clear: Color::from_straight(0.1, 0.3, 0.3, 1.0),
            renderers: None,
        }
    }
}

impl App for DemoApp {
    fn on_init(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let sheet = Texture::load(gpu.device(), gpu.queue(), &self.config.spritesheet)
            .context("loading sprite sheet")?;

        let sprite = SpriteRenderer::new(gpu.device(), gpu.surface_format(), sheet)
            .context("creating sprite renderer")?;
        let text = TextRenderer::new(gpu.device(), gpu.queue(), gpu.surface_format(), &self.atlas)
            .context("creating text renderer")?;

        self.renderers = Some(Renderers { sprite, text });
        log::info!("demo initialized ({} glyphs)", self.atlas.len());
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.pressed(Key::Escape) {
            return AppControl::Exit;
        }

        let transform = self.sprite.update_from_input(ctx.input, ctx.time.dt);

        let Some(renderers) = self.renderers.as_mut() else {
            return AppControl::Continue;
        };

        // A skipped frame must not leak its text into the next one.
        renderers.text.begin_frame();

        let viewport = ctx.viewport();
        let scale = self.config.text_scale;
        let top = viewport.height - 60.0 * scale;

        renderers
            .text
            .draw_text(&self.atlas, &self.config.title, 25.0, top, scale, Color::white());
        renderers.text.draw_text(
            &self.atlas,
            HELP_TEXT,
            25.0,
            top - 60.0 * scale,
            0.6 * scale,
            Color::from_straight(0.8, 0.9, 1.0, 0.9),
        );
        renderers.text.draw_text(
            &self.atlas,
            &format!("x {:+.2}  y {:+.2}", transform.position.x, transform.position.y),
            25.0,
            25.0,
            0.5 * scale,
            Color::from_straight(1.0, 0.85, 0.3, 1.0),
        );

        let geometry = self.sprite.geometry();
        let camera = &self.camera;
        ctx.render(self.clear, |rctx, target| {
            renderers.sprite.upload_and_draw(rctx, target, geometry, &transform, camera);
            renderers.text.render(rctx, target);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_fonts_are_reported() {
        let config = DemoConfig {
            font_paths: vec![PathBuf::from("/nonexistent/a.ttf"), PathBuf::from("/nonexistent/b.ttf")],
            ..DemoConfig::default()
        };
        let err = load_atlas(&config).unwrap_err();
        assert!(err.to_string().contains("PIXELPEN_FONT"), "{err}");
    }

    #[test]
    fn camera_and_speed_follow_config() {
        let config = DemoConfig { zoom: 250.0, sprite_speed: 3.0, ..DemoConfig::default() };
        let app = DemoApp::new(config, GlyphAtlas::default());
        assert_eq!(app.camera.zoom, 250.0);
        assert_eq!(app.sprite.speed(), 3.0);
        assert!(app.renderers.is_none());
    }
}
