use std::path::{Path, PathBuf};

use super::common::linear_clamp_sampler;

/// Failure while loading an image into a GPU texture. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum TextureLoadError {
    #[error("failed to decode image {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {} is empty", path.display())]
    Empty { path: PathBuf },
}

/// A sampled 2D RGBA texture (texture + view + sampler).
pub struct Texture {
    // Owns the storage behind `view`.
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: (u32, u32),
}

impl Texture {
    /// Decodes the image at `path` and uploads it as `Rgba8UnormSrgb`.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Result<Self, TextureLoadError> {
        let path = path.as_ref();
        let rgba = image::open(path)
            .map_err(|source| TextureLoadError::Decode { path: path.to_path_buf(), source })?
            .to_rgba8();

        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureLoadError::Empty { path: path.to_path_buf() });
        }

        log::info!("loaded texture {} ({width}x{height})", path.display());
        let label = path.file_name().and_then(|n| n.to_str()).unwrap_or("texture");
        Ok(Self::from_rgba8(device, queue, label, width, height, rgba.as_raw()))
    }

    /// Uploads tightly packed RGBA8 pixels.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Self {
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = linear_clamp_sampler(device, label);

        Self { _texture: texture, view, sampler, size: (width, height) }
    }
}

