//! Spatial anchor records and the geometry they carry.

use serde::{Deserialize, Serialize};

use super::chain::ExtensionChain;
use super::{Decode, DecodeError, Encode, Reader, StructureType, Writer};
use crate::handle::SpaceHandle;

/// Runtime timestamp in nanoseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Time(pub i64);

/// A three-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternionf {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternionf {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

/// A pose: orientation plus position, relative to some base space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Posef {
    pub orientation: Quaternionf,
    pub position: Vector3f,
}

impl Posef {
    /// The identity pose at the base space origin.
    pub fn identity() -> Self {
        Self::default()
    }
}

/// Input record for creating a spatial anchor at a given pose.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnchorCreateInfo {
    pub base_space: SpaceHandle,
    pub time: Time,
    pub pose: Posef,
    pub chain: ExtensionChain,
}

impl AnchorCreateInfo {
    pub fn new(base_space: SpaceHandle, time: Time, pose: Posef) -> Self {
        Self {
            base_space,
            time,
            pose,
            chain: ExtensionChain::new(),
        }
    }

    /// Info for a pose relative to the default reference space, resolved by
    /// the runtime at the time of the call.
    pub fn default_at(pose: Posef) -> Self {
        Self::new(SpaceHandle::NULL, Time(0), pose)
    }
}

impl Encode for AnchorCreateInfo {
    fn encode(&self, w: &mut Writer) {
        w.put_tag(StructureType::AnchorCreateInfo);
        w.put_u64(self.base_space.raw());
        w.put_i64(self.time.0);
        w.put_f32(self.pose.orientation.x);
        w.put_f32(self.pose.orientation.y);
        w.put_f32(self.pose.orientation.z);
        w.put_f32(self.pose.orientation.w);
        w.put_f32(self.pose.position.x);
        w.put_f32(self.pose.position.y);
        w.put_f32(self.pose.position.z);
        self.chain.encode(w);
    }
}

impl Decode for AnchorCreateInfo {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.expect_tag(StructureType::AnchorCreateInfo)?;
        let base_space = SpaceHandle::from_raw(r.get_u64()?);
        let time = Time(r.get_i64()?);
        let orientation = Quaternionf {
            x: r.get_f32()?,
            y: r.get_f32()?,
            z: r.get_f32()?,
            w: r.get_f32()?,
        };
        let position = Vector3f {
            x: r.get_f32()?,
            y: r.get_f32()?,
            z: r.get_f32()?,
        };
        let chain = ExtensionChain::decode(r)?;
        Ok(Self {
            base_space,
            time,
            pose: Posef {
                orientation,
                position,
            },
            chain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{decode_from_slice, encode_to_vec};

    #[test]
    fn test_identity_pose() {
        let pose = Posef::identity();
        assert_eq!(pose.orientation.w, 1.0);
        assert_eq!(pose.position, Vector3f::default());
    }

    #[test]
    fn test_create_info_roundtrip() {
        let info = AnchorCreateInfo::new(
            SpaceHandle::from_raw(5),
            Time(1_000_000),
            Posef {
                orientation: Quaternionf::default(),
                position: Vector3f {
                    x: 1.0,
                    y: 2.0,
                    z: -3.0,
                },
            },
        );
        let buf = encode_to_vec(&info);
        // tag(4) + space(8) + time(8) + pose(28) + chain(4)
        assert_eq!(buf.len(), 52);
        let decoded: AnchorCreateInfo = decode_from_slice(&buf).unwrap();
        assert_eq!(decoded, info);
    }
}
