use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

/// Point in scene space: `x`/`z` span the map plane, `y` is height above it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn planar(self) -> Vec2 {
        vec2(self.x, self.z)
    }

    pub fn with_planar(self, planar: Vec2) -> Self {
        Self {
            x: planar.x,
            y: self.y,
            z: planar.y,
        }
    }

    pub fn with_height(self, y: f32) -> Self {
        Self { y, ..self }
    }

    pub fn distance(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Same plane position, ignoring height.
    pub fn planar_eq(self, other: Self) -> bool {
        self.x == other.x && self.z == other.z
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f32,
    pub south: f32,
    pub east: f32,
    pub west: f32,
}

impl GeoBounds {
    pub fn is_valid(&self) -> bool {
        self.north.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.west.is_finite()
            && self.north > self.south
            && self.east > self.west
    }

    pub fn contains(&self, lat: f32, lon: f32) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lon)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub company: String,
    pub name: String,
    pub lat: f32,
    pub lon: f32,
}

/// Linear lat/lon to plane mapping over a fixed-size square surface.
///
/// Coordinates outside the bounds simply land outside `[-S/2, S/2]`; the normalizer takes
/// care of pulling them back in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projector {
    bounds: GeoBounds,
    surface_size: f32,
}

impl Projector {
    pub fn new(bounds: GeoBounds, surface_size: f32) -> Self {
        Self {
            bounds,
            surface_size,
        }
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn project(&self, lat: f32, lon: f32, elevation: f32) -> Position3 {
        let size = self.surface_size;
        let x = ((lon - self.bounds.west) / (self.bounds.east - self.bounds.west)) * size
            - size / 2.0;
        let z = ((lat - self.bounds.south) / (self.bounds.north - self.bounds.south)) * size
            - size / 2.0;
        Position3::new(x, elevation / 100.0, z)
    }

    /// Inverse of [`Projector::project`] on the plane; returns `(lat, lon)`.
    pub fn unproject(&self, x: f32, z: f32) -> (f32, f32) {
        let size = self.surface_size;
        let lon =
            ((x + size / 2.0) / size) * (self.bounds.east - self.bounds.west) + self.bounds.west;
        let lat =
            ((z + size / 2.0) / size) * (self.bounds.north - self.bounds.south) + self.bounds.south;
        (lat, lon)
    }
}
