use std::path::Path;

use image::RgbaImage;
use wgpu::util::DeviceExt;

/// GPU copy of the packed tile atlas.
pub struct AtlasTexture {
    pub texture_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl AtlasTexture {
    /// Reopen an atlas PNG written by the builder and upload it.
    pub fn from_file(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgba8();
        Ok(Self::upload(device, queue, &img))
    }

    /// Upload `img`. An empty image becomes a 1×1 transparent texture.
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, img: &RgbaImage) -> Self {
        let placeholder;
        let img = if img.width() == 0 || img.height() == 0 {
            placeholder = RgbaImage::new(1, 1);
            &placeholder
        } else {
            img
        };

        let (width, height) = img.dimensions();
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("tile_atlas_tex"),
                size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            img.as_raw(),
        );
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        // Nearest filtering keeps pixel-art tiles crisp and stops neighbours
        // in the strip from bleeding into each other.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self { texture_view, sampler, width, height }
    }
}
