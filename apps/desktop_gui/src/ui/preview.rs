//! Decoding of local raster and SVG files into displayable bitmaps.

use std::path::Path;

use client_core::dimensions::{self, DEFAULT_IMAGE_DPI};
use eframe::egui;
use image::GenericImageView;
use resvg::{tiny_skia, usvg};

/// Longest edge kept for on-screen previews.
const MAX_PREVIEW_EDGE: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewSlot {
    Original,
    Result,
}

#[derive(Clone)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
    /// SVG rasterization yields premultiplied alpha.
    pub premultiplied: bool,
}

impl PreviewImage {
    pub fn to_color_image(&self) -> egui::ColorImage {
        let size = [self.width, self.height];
        if self.premultiplied {
            egui::ColorImage::from_rgba_premultiplied(size, &self.rgba)
        } else {
            egui::ColorImage::from_rgba_unmultiplied(size, &self.rgba)
        }
    }
}

pub fn is_svg(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

pub fn decode_preview(path: &Path) -> Result<PreviewImage, String> {
    if is_svg(path) {
        rasterize_svg(path)
    } else {
        decode_raster(path)
    }
}

fn decode_raster(path: &Path) -> Result<PreviewImage, String> {
    let dynamic = image::open(path).map_err(|err| err.to_string())?;
    let resized = if dynamic.width().max(dynamic.height()) > MAX_PREVIEW_EDGE {
        dynamic
            .thumbnail(MAX_PREVIEW_EDGE, MAX_PREVIEW_EDGE)
            .to_rgba8()
    } else {
        dynamic.to_rgba8()
    };
    Ok(PreviewImage {
        width: resized.width() as usize,
        height: resized.height() as usize,
        rgba: resized.into_raw(),
        premultiplied: false,
    })
}

fn rasterize_svg(path: &Path) -> Result<PreviewImage, String> {
    let data = std::fs::read(path).map_err(|err| err.to_string())?;
    let tree = usvg::Tree::from_data(&data, &usvg::Options::default())
        .map_err(|err| format!("invalid svg: {err}"))?;
    let size = tree.size();
    let (width, height) = fit_within(
        (size.width(), size.height()),
        (MAX_PREVIEW_EDGE as f32, MAX_PREVIEW_EDGE as f32),
    );
    let width = width.max(1.0) as u32;
    let height = height.max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| format!("svg has an unusable size {width}x{height}"))?;
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(PreviewImage {
        width: width as usize,
        height: height as usize,
        rgba: pixmap.take(),
        premultiplied: true,
    })
}

/// Largest size with the source aspect ratio that fits the region.
pub fn fit_within(source: (f32, f32), region: (f32, f32)) -> (f32, f32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = region;
    if src_w <= 0.0 || src_h <= 0.0 || max_w <= 0.0 || max_h <= 0.0 {
        return (0.0, 0.0);
    }
    let image_ratio = src_w / src_h;
    if image_ratio > max_w / max_h {
        (max_w, (max_w / image_ratio).floor())
    } else {
        ((max_h * image_ratio).floor(), max_h)
    }
}

/// Print size in cm. Raster files use their stored DPI; SVG user units count at 96 DPI.
pub fn print_size_cm(path: &Path) -> Result<(f64, f64), String> {
    if !is_svg(path) {
        return dimensions::physical_size(path).map_err(|err| err.to_string());
    }
    let data = std::fs::read(path).map_err(|err| err.to_string())?;
    let tree = usvg::Tree::from_data(&data, &usvg::Options::default())
        .map_err(|err| format!("invalid svg: {err}"))?;
    let size = tree.size().to_int_size();
    Ok(dimensions::size_cm(
        (size.width(), size.height()),
        (DEFAULT_IMAGE_DPI, DEFAULT_IMAGE_DPI),
    ))
}
