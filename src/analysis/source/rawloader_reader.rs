//! Camera RAW reader built on `rawloader` and `bayer`.
//!
//! Field photos of leaves are sometimes shot in RAW. The sensor mosaic is
//! black/white-level normalised, demosaiced, white balanced and gamma
//! encoded to 8-bit sRGB-like values the classifier was trained on.

use std::io::Cursor;

use anyhow::{Context, anyhow};
use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use image::{Rgba, RgbaImage};
use rawloader::RawImageData as RawloaderImageData;
use tracing::debug;

use crate::analysis::common::error::{AnalysisError, Result};
use crate::analysis::source::reader::ImageSourceReader;
use crate::analysis::source::types::RawImage;

/// RAW image reader that uses the rawloader library for decoding.
///
/// Supports whatever rawloader can decode (ARW, CR2, NEF, RAF, DNG, ...)
/// as long as the sensor is a single-channel Bayer mosaic.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawLoaderReader;

/// Display gamma applied after white balance.
const GAMMA: f32 = 1.0 / 2.2;

impl ImageSourceReader for RawLoaderReader {
    fn read_image(&self, data: &[u8]) -> Result<RawImage> {
        debug!("Decoding RAW image, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| AnalysisError::InvalidImageError(e.to_string()))?;

        let (width, height) = (decoded.width, decoded.height);
        debug!(
            "Decoded RAW {}x{}, cpp={}, cfa={}",
            width, height, decoded.cpp, decoded.cfa.name
        );

        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidImageError(format!(
                "zero dimension: {}x{}",
                width, height
            )));
        }
        if decoded.cpp != 1 {
            return Err(AnalysisError::InvalidImageError(format!(
                "{} components per pixel, only Bayer mosaics are supported",
                decoded.cpp
            )));
        }

        // Float data is normalised 0.0-1.0, scale it into the integer range
        let mosaic: Vec<u16> = match decoded.data {
            RawloaderImageData::Integer(values) => values,
            RawloaderImageData::Float(values) => values
                .iter()
                .map(|&v| (v.clamp(0.0, 1.0) * u16::MAX as f32) as u16)
                .collect(),
        };

        let black = decoded.blacklevels[0] as f32;
        let white = decoded.whitelevels[0] as f32;
        let levels = Levels {
            black,
            range: (white - black).max(1.0),
            wb: white_balance(decoded.wb_coeffs),
        };

        let cfa = cfa_from_name(&decoded.cfa.name);
        let rgb = demosaic(&mosaic, width, height, cfa)
            .map_err(|e| AnalysisError::InvalidImageError(format!("{:#}", e)))?;

        let buffer = to_display_rgba(&rgb, width as u32, height as u32, &levels);
        RawImage::from_rgba(buffer)
    }
}

struct Levels {
    black: f32,
    range: f32,
    wb: [f32; 3],
}

/// Normalises the camera's multipliers to green = 1; unusable values fall back to neutral.
fn white_balance(coeffs: [f32; 4]) -> [f32; 3] {
    let green = coeffs[1];
    if !green.is_finite() || green <= 0.0 {
        return [1.0, 1.0, 1.0];
    }
    let scaled = |c: f32| {
        let v = c / green;
        if v.is_finite() && v > 0.0 { v } else { 1.0 }
    };
    [scaled(coeffs[0]), 1.0, scaled(coeffs[2])]
}

fn cfa_from_name(name: &str) -> CFA {
    match name.get(..4) {
        Some("BGGR") => CFA::BGGR,
        Some("GBRG") => CFA::GBRG,
        Some("GRBG") => CFA::GRBG,
        _ => CFA::RGGB,
    }
}

/// Bilinear demosaic of a 16-bit mosaic into interleaved 16-bit RGB.
fn demosaic(mosaic: &[u16], width: usize, height: usize, cfa: CFA) -> anyhow::Result<Vec<u16>> {
    if mosaic.len() < width * height {
        return Err(anyhow!(
            "mosaic has {} samples, {}x{} needs {}",
            mosaic.len(),
            width,
            height,
            width * height
        ));
    }

    let bayer_bytes: Vec<u8> = mosaic[..width * height]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();

    let mut output_buf = vec![0u8; width * height * 3 * 2];
    {
        let mut raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output_buf);
        bayer::run_demosaic(
            &mut Cursor::new(&bayer_bytes[..]),
            BayerDepth::Depth16LE,
            cfa,
            Demosaic::Linear,
            &mut raster,
        )
        .map_err(|e| anyhow!("{:?}", e))
        .context("demosaic failed")?;
    }

    Ok(output_buf
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect())
}

fn to_display_rgba(rgb: &[u16], width: u32, height: u32, levels: &Levels) -> RgbaImage {
    let encode = |raw: u16, channel: usize| -> u8 {
        let linear = ((raw as f32 - levels.black).max(0.0) / levels.range) * levels.wb[channel];
        (linear.clamp(0.0, 1.0).powf(GAMMA) * 255.0).round() as u8
    };

    let mut buffer = RgbaImage::new(width, height);
    for (dst, px) in buffer.pixels_mut().zip(rgb.chunks_exact(3)) {
        *dst = Rgba([encode(px[0], 0), encode(px[1], 1), encode(px[2], 2), 255]);
    }
    buffer
}
