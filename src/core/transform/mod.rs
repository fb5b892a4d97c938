//! World-space transform extraction
//!
//! Decomposes an object's world matrix into position, rotation (unit
//! quaternion) and scale for the placement metadata written next to an upload.

use crate::domain::{Matrix4, SceneObject};
use serde::{Deserialize, Serialize};

/// Scale magnitudes below this are treated as degenerate
const DEGENERATE_SCALE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Rotation quaternion, serialised as `{x, y, z, w}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    fn normalized(self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len < DEGENERATE_SCALE {
            return Self::IDENTITY;
        }
        // q and -q are the same rotation; keep w non-negative so output is stable
        let sign = if self.w < 0.0 { -1.0 } else { 1.0 };
        Self {
            x: sign * self.x / len,
            y: sign * self.y / len,
            z: sign * self.z / len,
            w: sign * self.w / len,
        }
    }
}

/// World-space placement of one object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformData {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for TransformData {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Reads the world-space transform of an object
pub fn extract(object: &SceneObject) -> TransformData {
    decompose(&object.world_matrix)
}

/// Splits a column-major affine matrix into translation, rotation and scale
pub fn decompose(m: &Matrix4) -> TransformData {
    let position = Vec3::new(m[3][0], m[3][1], m[3][2]);

    let columns = [
        Vec3::new(m[0][0], m[0][1], m[0][2]),
        Vec3::new(m[1][0], m[1][1], m[1][2]),
        Vec3::new(m[2][0], m[2][1], m[2][2]),
    ];
    let mut scale = Vec3::new(
        columns[0].length(),
        columns[1].length(),
        columns[2].length(),
    );

    // A mirrored basis shows up as a negative determinant; fold it into x
    if determinant3(m) < 0.0 {
        scale.x = -scale.x;
    }

    let degenerate = [scale.x, scale.y, scale.z]
        .iter()
        .any(|s| s.abs() < DEGENERATE_SCALE);
    let rotation = if degenerate {
        Quat::IDENTITY
    } else {
        let s = [scale.x, scale.y, scale.z];
        // r[row][col]
        let mut r = [[0.0; 3]; 3];
        for (col, column) in columns.iter().enumerate() {
            r[0][col] = column.x / s[col];
            r[1][col] = column.y / s[col];
            r[2][col] = column.z / s[col];
        }
        quat_from_rotation(&r)
    };

    TransformData {
        position,
        rotation,
        scale,
    }
}

fn determinant3(m: &Matrix4) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[2][1] * m[1][2])
        - m[1][0] * (m[0][1] * m[2][2] - m[2][1] * m[0][2])
        + m[2][0] * (m[0][1] * m[1][2] - m[1][1] * m[0][2])
}

/// Shepperd's method, branching on the largest diagonal term for stability
fn quat_from_rotation(r: &[[f64; 3]; 3]) -> Quat {
    let trace = r[0][0] + r[1][1] + r[2][2];
    let q = if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        Quat {
            w: 0.25 * s,
            x: (r[2][1] - r[1][2]) / s,
            y: (r[0][2] - r[2][0]) / s,
            z: (r[1][0] - r[0][1]) / s,
        }
    } else if r[0][0] > r[1][1] && r[0][0] > r[2][2] {
        let s = (1.0 + r[0][0] - r[1][1] - r[2][2]).sqrt() * 2.0;
        Quat {
            w: (r[2][1] - r[1][2]) / s,
            x: 0.25 * s,
            y: (r[0][1] + r[1][0]) / s,
            z: (r[0][2] + r[2][0]) / s,
        }
    } else if r[1][1] > r[2][2] {
        let s = (1.0 + r[1][1] - r[0][0] - r[2][2]).sqrt() * 2.0;
        Quat {
            w: (r[0][2] - r[2][0]) / s,
            x: (r[0][1] + r[1][0]) / s,
            y: 0.25 * s,
            z: (r[1][2] + r[2][1]) / s,
        }
    } else {
        let s = (1.0 + r[2][2] - r[0][0] - r[1][1]).sqrt() * 2.0;
        Quat {
            w: (r[1][0] - r[0][1]) / s,
            x: (r[0][2] + r[2][0]) / s,
            y: (r[1][2] + r[2][1]) / s,
            z: 0.25 * s,
        }
    };
    q.normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IDENTITY;
    use std::f64::consts::FRAC_1_SQRT_2;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_identity() {
        assert_eq!(decompose(&IDENTITY), TransformData::default());
    }

    #[test]
    fn test_translation() {
        let mut m = IDENTITY;
        m[3] = [1.5, -2.0, 3.25, 1.0];
        let t = decompose(&m);
        assert_eq!(t.position, Vec3::new(1.5, -2.0, 3.25));
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_rotation_about_z() {
        // 90 degrees about +Z: x axis maps to +Y
        let m = [
            [0.0, 1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let q = decompose(&m).rotation;
        assert!(close(q.x, 0.0) && close(q.y, 0.0));
        assert!(close(q.z, FRAC_1_SQRT_2));
        assert!(close(q.w, FRAC_1_SQRT_2));
    }

    #[test]
    fn test_half_turn_about_x_uses_diagonal_branch() {
        let m = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, -1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let q = decompose(&m).rotation;
        assert!(close(q.x, 1.0));
        assert!(close(q.w, 0.0));
    }

    #[test]
    fn test_non_uniform_scale() {
        let mut m = IDENTITY;
        m[0][0] = 2.0;
        m[1][1] = 3.0;
        m[2][2] = 4.0;
        let t = decompose(&m);
        assert_eq!(t.scale, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_mirrored_scale_keeps_rotation_proper() {
        let mut m = IDENTITY;
        m[0][0] = -1.0;
        let t = decompose(&m);
        assert_eq!(t.scale, Vec3::new(-1.0, 1.0, 1.0));
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_zero_scale_falls_back_to_identity_rotation() {
        let mut m = IDENTITY;
        m[2][2] = 0.0;
        assert_eq!(decompose(&m).rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_serialises_as_xyzw() {
        let json = serde_json::to_value(TransformData::default()).unwrap();
        assert_eq!(json["rotation"]["w"], 1.0);
        assert_eq!(json["scale"]["x"], 1.0);
    }
}
