//! Procedural particle sprites.
//!
//! Each confetti shape is baked once per burst into a small straight-alpha
//! RGBA8 bitmap. Edges are anti-aliased with a fixed 4x4 supersample grid.
//! Pixel space is y-down with the origin at the top-left corner of the sprite.

use std::f32::consts::PI;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::data::ConfettiShape;
use crate::error::SpriteError;

/// Largest edge length accepted for a baked sprite.
pub const MAX_SPRITE_SIZE: u32 = 1024;

/// Subsamples per pixel edge.
const SUPERSAMPLE: u32 = 4;

/// Line segments used to flatten each rounded star point.
const ARC_SEGMENTS: usize = 8;

/// Degrees between consecutive star points. Stepping by 144° five times
/// visits every point of a pentagram once.
pub const STAR_STEP_DEGREES: f32 = 144.0;

/// A baked RGBA8 sprite.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfettiSprite {
    size: UVec2,
    data: Vec<u8>,
}

impl ConfettiSprite {
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Raw RGBA8 rows, top row first.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA of the pixel at `(x, y)`, or `None` outside the sprite.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        let i = ((y * self.size.x + x) * 4) as usize;
        self.data.get(i..i + 4)?.try_into().ok()
    }

    /// Smallest pixel rectangle holding every non-transparent pixel.
    pub fn coverage_bounds(&self) -> Option<URect> {
        let mut bounds: Option<URect> = None;
        for (i, rgba) in self.data.chunks_exact(4).enumerate() {
            if rgba[3] == 0 {
                continue;
            }
            let i = i as u32;
            let p = UVec2::new(i % self.size.x, i / self.size.x);
            bounds = Some(match bounds {
                Some(b) => URect::from_corners(b.min.min(p), b.max.max(p + UVec2::ONE)),
                None => URect::from_corners(p, p + UVec2::ONE),
            });
        }
        bounds
    }

    /// Upload-ready texture for the sprite renderer.
    pub fn to_image(&self) -> Image {
        Image::new(
            Extent3d {
                width: self.size.x,
                height: self.size.y,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            self.data.clone(),
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
        )
    }
}

/// Geometry knobs for the rounded five-pointed star.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarStyle {
    /// Angle of the first point, in degrees, measured clockwise from +x in
    /// pixel space.
    pub rotation_degrees: f32,
    /// Radius of the arc that rounds each point.
    pub corner_radius: f32,
}

impl Default for StarStyle {
    fn default() -> Self {
        Self {
            rotation_degrees: 54.0,
            corner_radius: 0.1,
        }
    }
}

/// Flattened outline of a rounded star.
#[derive(Clone, Debug)]
pub struct StarPath {
    /// Centres of the five corner arcs, in drawing order.
    pub corners: [Vec2; 5],
    /// Closed polygon; the last point connects back to the first.
    pub outline: Vec<Vec2>,
}

/// Angles (degrees) of the five star points in drawing order.
pub fn star_point_angles(rotation_degrees: f32) -> [f32; 5] {
    std::array::from_fn(|i| rotation_degrees + STAR_STEP_DEGREES * i as f32)
}

/// Build the rounded star outline inscribed in a `size` box.
///
/// Points sit at `0.95 * r - corner_radius` from the centre, where `r` is half
/// the box width. Each point is an arc sweeping 144° around its corner centre,
/// and consecutive arcs are joined by straight edges.
pub fn rounded_star_path(size: Vec2, style: StarStyle) -> StarPath {
    let center = size / 2.0;
    let r = size.x / 2.0;
    let rc = style.corner_radius;
    let rn = r * 0.95 - rc;

    let angles = star_point_angles(style.rotation_degrees);
    let corners = angles.map(|a| center + rn * unit(a));

    let mut outline = Vec::with_capacity(5 * (ARC_SEGMENTS + 1));
    for (cc, a) in corners.iter().zip(angles) {
        let start = a - 72.0;
        for s in 0..=ARC_SEGMENTS {
            let t = start + 144.0 * s as f32 / ARC_SEGMENTS as f32;
            outline.push(*cc + rc * unit(t));
        }
    }

    StarPath { corners, outline }
}

/// Rasterize `shape` filling a `size` box with `color`.
pub fn rasterize(
    shape: ConfettiShape,
    size: UVec2,
    color: Srgba,
    star: StarStyle,
) -> Result<ConfettiSprite, SpriteError> {
    if size.x == 0 || size.y == 0 {
        return Err(SpriteError::EmptySize {
            width: size.x,
            height: size.y,
        });
    }
    if size.x > MAX_SPRITE_SIZE || size.y > MAX_SPRITE_SIZE {
        return Err(SpriteError::TooLarge {
            width: size.x,
            height: size.y,
            max: MAX_SPRITE_SIZE,
        });
    }

    match shape {
        ConfettiShape::Rectangle | ConfettiShape::Square => Ok(fill(size, color, |_| true)),
        ConfettiShape::Circle => {
            let radii = size.as_vec2() / 2.0;
            Ok(fill(size, color, |p| {
                let d = (p - radii) / radii;
                d.length_squared() <= 1.0
            }))
        }
        ConfettiShape::Star => {
            if !star.corner_radius.is_finite() || star.corner_radius < 0.0 {
                return Err(SpriteError::InvalidCornerRadius(star.corner_radius));
            }
            let path = rounded_star_path(size.as_vec2(), star);
            Ok(fill(size, color, |p| winding_number(&path.outline, p) != 0))
        }
    }
}

/// Supersampled coverage fill. `inside` receives pixel-space sample points.
fn fill(size: UVec2, color: Srgba, inside: impl Fn(Vec2) -> bool) -> ConfettiSprite {
    let [r, g, b, a] = color.to_u8_array();
    let samples = (SUPERSAMPLE * SUPERSAMPLE) as f32;
    let mut data = Vec::with_capacity((size.x * size.y * 4) as usize);

    for y in 0..size.y {
        for x in 0..size.x {
            let mut hits = 0u32;
            for sy in 0..SUPERSAMPLE {
                for sx in 0..SUPERSAMPLE {
                    let p = Vec2::new(
                        x as f32 + (sx as f32 + 0.5) / SUPERSAMPLE as f32,
                        y as f32 + (sy as f32 + 0.5) / SUPERSAMPLE as f32,
                    );
                    if inside(p) {
                        hits += 1;
                    }
                }
            }
            let coverage = hits as f32 / samples;
            let alpha = (a as f32 * coverage).round() as u8;
            data.extend_from_slice(&[r, g, b, alpha]);
        }
    }

    ConfettiSprite { size, data }
}

/// Non-zero winding test; the pentagram overlaps itself, so its centre has
/// winding 2 and must still count as filled.
fn winding_number(polygon: &[Vec2], p: Vec2) -> i32 {
    let mut wn = 0;
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        let cross = (b - a).perp_dot(p - a);
        if a.y <= p.y {
            if b.y > p.y && cross > 0.0 {
                wn += 1;
            }
        } else if b.y <= p.y && cross < 0.0 {
            wn -= 1;
        }
    }
    wn
}

fn unit(degrees: f32) -> Vec2 {
    let rad = degrees * PI / 180.0;
    Vec2::new(rad.cos(), rad.sin())
}
