use tandem_shared::{Quaternion, Vec3};

/// Where a host should put its camera rig so the camera lands on the avatar
pub fn rig_position_from_avatar(avatar_position: Vec3, camera_height: f64) -> Vec3 {
    Vec3::new(
        avatar_position.x,
        avatar_position.y - camera_height,
        avatar_position.z,
    )
}

pub fn is_finite_pose(position: &Vec3, rotation: &Quaternion) -> bool {
    position.is_finite() && rotation.is_finite()
}
