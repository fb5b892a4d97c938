//! Pre-flight validation of an export unit
//!
//! Everything here is a pure function of the scene snapshot, the export
//! settings and the limits: no I/O, and identical inputs give identical
//! reports.

use super::report::{format_size, ValidationLimits, ValidationReport};
use crate::core::export::{ExportFormat, ExportSettings};
use crate::domain::{LiftError, Result, SceneObject, TextureRef};
use std::collections::BTreeSet;

/// Bytes per vertex (position) in the uncompressed estimate
const BYTES_PER_VERTEX: u64 = 12;
/// Bytes per face (three u32 indices) in the uncompressed estimate
const BYTES_PER_FACE: u64 = 12;
/// Assumed size of a texture whose dimensions are unknown
const UNKNOWN_TEXTURE_BYTES: u64 = 1024 * 1024;
/// Percentage removed from geometry per compression level
const COMPRESSION_PERCENT_PER_LEVEL: u64 = 8;
/// Container overhead in percent
const CONTAINER_OVERHEAD_PERCENT: u64 = 20;

/// Validates one unit's members against the limits
///
/// # Errors
///
/// Returns [`LiftError::EmptySelection`] when `members` is empty. Limit
/// overages are reported in the returned report, not as errors.
pub fn validate(
    members: &[&SceneObject],
    settings: &ExportSettings,
    limits: &ValidationLimits,
) -> Result<ValidationReport> {
    if members.is_empty() {
        return Err(LiftError::EmptySelection);
    }

    let meshes: Vec<&SceneObject> = members.iter().copied().filter(|o| o.is_mesh()).collect();
    let triangles = estimate_triangles(&meshes);
    let textures = unique_textures(&meshes);
    let size = estimate_size(&meshes, &textures, settings);

    let mut report = ValidationReport::new(triangles, size);

    if meshes.is_empty() {
        report.block("Unit contains no mesh objects".to_string());
    }

    if settings.format == ExportFormat::Separate {
        report.block(
            "Separate format writes several files; binary format is required for upload"
                .to_string(),
        );
    }

    if triangles > limits.max_triangle_count {
        report.block(format!(
            "Triangle count {triangles} exceeds limit {}",
            limits.max_triangle_count
        ));
    } else if near_limit(triangles, limits.max_triangle_count) {
        report.warn(format!(
            "Triangle count {triangles} is close to the limit of {}",
            limits.max_triangle_count
        ));
    }

    if size > limits.max_file_size_bytes {
        report.block(format!(
            "Estimated size {} exceeds limit {}",
            format_size(size),
            format_size(limits.max_file_size_bytes)
        ));
    } else if near_limit(size, limits.max_file_size_bytes) {
        report.warn(format!(
            "Estimated size {} is close to the limit of {}",
            format_size(size),
            format_size(limits.max_file_size_bytes)
        ));
    }

    for (material, texture) in &textures {
        if texture.is_missing() {
            report.warn(format!(
                "Material '{material}' references missing texture '{}'",
                texture.name
            ));
        } else if texture.max_dimension() > limits.max_texture_dimension {
            report.warn(format!(
                "Texture '{}' is {}x{}, above the {}px limit",
                texture.name, texture.width, texture.height, limits.max_texture_dimension
            ));
        }
    }

    if settings.apply_modifiers {
        for obj in meshes.iter().filter(|o| o.has_visible_modifiers()) {
            report.warn(format!(
                "Object '{}' has modifiers that will be applied on export",
                obj.name
            ));
        }
    }

    Ok(report)
}

fn estimate_triangles(meshes: &[&SceneObject]) -> u64 {
    meshes.iter().map(|o| o.face_count).sum()
}

/// Textures referenced by the meshes, first reference wins, keyed by name
fn unique_textures<'a>(meshes: &[&'a SceneObject]) -> Vec<(&'a str, &'a TextureRef)> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for obj in meshes.iter().copied() {
        for material in &obj.materials {
            for texture in &material.textures {
                if seen.insert(texture.name.as_str()) {
                    out.push((material.name.as_str(), texture));
                }
            }
        }
    }
    out
}

fn estimate_size(
    meshes: &[&SceneObject],
    textures: &[(&str, &TextureRef)],
    settings: &ExportSettings,
) -> u64 {
    let raw_geometry: u64 = meshes
        .iter()
        .map(|o| o.vertex_count * BYTES_PER_VERTEX + o.face_count * BYTES_PER_FACE)
        .sum();
    let kept_percent =
        100 - COMPRESSION_PERCENT_PER_LEVEL * u64::from(settings.compression_level.min(10));
    let geometry = raw_geometry * kept_percent / 100;

    let image_bytes: u64 = textures
        .iter()
        .filter(|(_, t)| !t.is_missing())
        .map(|(_, t)| texture_bytes(t, settings.texture_size_limit))
        .sum();

    (geometry + image_bytes) * (100 + CONTAINER_OVERHEAD_PERCENT) / 100
}

/// One byte per pixel after the encoder downsizes to the texture limit
fn texture_bytes(texture: &TextureRef, size_limit: u32) -> u64 {
    let (w, h) = (u64::from(texture.width), u64::from(texture.height));
    if w == 0 || h == 0 {
        return UNKNOWN_TEXTURE_BYTES;
    }
    let largest = w.max(h);
    let limit = u64::from(size_limit);
    if largest <= limit {
        w * h
    } else {
        (w * limit / largest) * (h * limit / largest)
    }
}

/// Above 80% of the limit
fn near_limit(value: u64, limit: u64) -> bool {
    value.saturating_mul(5) > limit.saturating_mul(4)
}
