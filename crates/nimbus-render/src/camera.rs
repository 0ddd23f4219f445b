use glam::{Mat4, Vec3};

/// Default eye position looking at the origin.
pub const DEFAULT_EYE: Vec3 = Vec3::new(1.0, 1.0, 2.0);
pub const DEFAULT_FOV_Y_RAD: f32 = std::f32::consts::FRAC_PI_4;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1.0e7;

/// Free-orbit camera around a target point, Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_rad: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::looking_at(DEFAULT_EYE, Vec3::ZERO)
    }
}

impl Camera {
    /// Orbit parameters that put the eye at `eye`, facing `target`.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        Self {
            target,
            distance,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            fov_y_rad: DEFAULT_FOV_Y_RAD,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    pub fn eye_position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * 0.005;
        self.pitch = (self.pitch - dy * 0.005).clamp(-1.5, 1.5);
    }

    pub fn view_proj(&self, width: f32, height: f32) -> Mat4 {
        let eye = self.eye_position();
        let view = Mat4::look_at_rh(eye, self.target, Vec3::Y);
        let aspect = width / height.max(1.0);
        let proj = Mat4::perspective_rh(self.fov_y_rad, aspect, self.near, self.far);
        proj * view
    }
}
