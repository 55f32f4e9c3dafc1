use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  Target payloads
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

// ════════════════════════════════════════════════════════════════
//  Legacy payloads
// ════════════════════════════════════════════════════════════════

/// Строковое сообщение: `{"data": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringMsg {
    pub data: String,
}

/// JSON-документ внутри `data` старого [`StringMsg`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyPose {
    pub pose: Point,
    pub orient: Quaternion,
}

impl LegacyPose {
    pub fn to_pose(self) -> Pose {
        Pose {
            position: self.pose,
            orientation: self.orient,
        }
    }
}
