use std::path::Path;

use crate::error::{Error, Result};

/// Edge length of procedural substitutes.
const SUBSTITUTE_SIZE: u32 = 64;

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Decode an image file. `key` is the texture path as the scene names it
    /// and picks the colour space.
    pub fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        key: &str,
    ) -> Result<Self> {
        let img = image::open(path)
            .map_err(|source| Error::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(
            device,
            queue,
            &img,
            width,
            height,
            format_for(key),
            key,
        ))
    }

    /// Decode `path`, or fall back to a procedural stand-in for `key` when it
    /// cannot be read.
    pub fn load_or_substitute(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        key: &str,
    ) -> Self {
        match Self::from_file(device, queue, path, key) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("{err}; using a procedural substitute for {key}");
                let data = substitute_pixels(key, SUBSTITUTE_SIZE);
                Self::from_rgba(
                    device,
                    queue,
                    &data,
                    SUBSTITUTE_SIZE,
                    SUBSTITUTE_SIZE,
                    format_for(key),
                    key,
                )
            }
        }
    }

    /// 1x1 white, bound where a material has no diffuse map.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(
            device,
            queue,
            &[255, 255, 255, 255],
            1,
            1,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            "Default Diffuse",
        )
    }

    /// 1x1 tangent-space +Z, bound where a material has no normal map.
    pub fn flat_normal(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(
            device,
            queue,
            &FLAT_NORMAL,
            1,
            1,
            wgpu::TextureFormat::Rgba8Unorm,
            "Default Normal",
        )
    }

    /// 1x1 mid-grey, bound where a material has no height map.
    pub fn flat_height(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(
            device,
            queue,
            &FLAT_HEIGHT,
            1,
            1,
            wgpu::TextureFormat::Rgba8Unorm,
            "Default Height",
        )
    }
}

const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];
const FLAT_HEIGHT: [u8; 4] = [128, 128, 128, 255];

/// Normal and height maps hold data, not colour, and are sampled linearly.
pub fn is_data_map(path: &str) -> bool {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path);
    stem.ends_with("_norm") || stem.ends_with("_height")
}

pub fn format_for(path: &str) -> wgpu::TextureFormat {
    if is_data_map(path) {
        wgpu::TextureFormat::Rgba8Unorm
    } else {
        wgpu::TextureFormat::Rgba8UnormSrgb
    }
}

/// RGBA pixels standing in for a missing file.
///
/// Data maps get a neutral value so lighting stays flat. Colour maps get
/// blocky noise from a palette seeded by the path, so different missing
/// textures remain distinguishable.
fn substitute_pixels(key: &str, size: u32) -> Vec<u8> {
    let stem = Path::new(key)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(key);
    if stem.ends_with("_norm") {
        return FLAT_NORMAL.repeat((size * size) as usize);
    }
    if stem.ends_with("_height") {
        return FLAT_HEIGHT.repeat((size * size) as usize);
    }

    let seed = key
        .bytes()
        .fold(0u32, |acc, b| hash(acc, b as u32, 0x9e37_79b9));
    let base = [
        (seed & 0xff) as i32,
        ((seed >> 8) & 0xff) as i32,
        ((seed >> 16) & 0xff) as i32,
    ];

    let mut data = vec![0u8; (size * size * 4) as usize];
    for y in 0..size {
        for x in 0..size {
            let idx = ((y * size + x) * 4) as usize;
            // 4x4 blocks
            let variation = (hash(x / 4, y / 4, seed) % 48) as i32 - 24;
            data[idx] = (base[0] + variation).clamp(0, 255) as u8;
            data[idx + 1] = (base[1] + variation).clamp(0, 255) as u8;
            data[idx + 2] = (base[2] + variation).clamp(0, 255) as u8;
            data[idx + 3] = 255;
        }
    }
    data
}

fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}
