//! Presentation attributes derived from object state. Renderers consume these values;
//! nothing here touches a renderer.

use crate::catalog::object::{AltitudeBin, ObjectKind, TrackedObject};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObjectStyle {
    pub color: Rgb,
    pub scale: f32,
}

impl AltitudeBin {
    /// Low orbits run warm, high orbits cool.
    pub fn color(self) -> Rgb {
        match self {
            AltitudeBin::Below200 => Rgb(0xe6, 0x39, 0x46),
            AltitudeBin::From200To400 => Rgb(0xf4, 0xa2, 0x61),
            AltitudeBin::From400To800 => Rgb(0xe9, 0xc4, 0x6a),
            AltitudeBin::From800To1200 => Rgb(0x2a, 0x9d, 0x8f),
            AltitudeBin::From1200To2000 => Rgb(0x45, 0x7b, 0x9d),
            AltitudeBin::Above2000 => Rgb(0x8e, 0x7d, 0xbe),
        }
    }
}

impl ObjectKind {
    pub fn marker_scale(self) -> f32 {
        match self {
            ObjectKind::Active => 1.0,
            ObjectKind::Junk => 0.6,
        }
    }
}

impl TrackedObject {
    pub fn style(&self) -> ObjectStyle {
        ObjectStyle {
            color: self.altitude_bin().color(),
            scale: self.kind().marker_scale(),
        }
    }
}
