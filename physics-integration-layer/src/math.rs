//! Precision-aware math aliases.
//!
//! Bevy's transforms are always `f32`, but the physics backend may be compiled with `f64`
//! precision. Everything the controller computes uses the aliases in this module, and converts
//! at the boundary with [`AdjustPrecision`] and [`AsF32`].

#[cfg(feature = "f64")]
use bevy::math::{DQuat, DVec3};
use bevy::math::{Quat, Vec3};

#[cfg(feature = "f64")]
pub type Float = f64;
#[cfg(not(feature = "f64"))]
pub type Float = f32;

#[cfg(feature = "f64")]
pub type Vector3 = DVec3;
#[cfg(not(feature = "f64"))]
pub type Vector3 = Vec3;

#[cfg(feature = "f64")]
pub type Quaternion = DQuat;
#[cfg(not(feature = "f64"))]
pub type Quaternion = Quat;

#[cfg(feature = "f64")]
pub use std::f64::consts as float_consts;
#[cfg(not(feature = "f64"))]
pub use std::f32::consts as float_consts;

/// Adjust the precision of the math construct to the precision chosen for compilation.
pub trait AdjustPrecision {
    type Adjusted;
    fn adjust_precision(&self) -> Self::Adjusted;
}

impl AdjustPrecision for f32 {
    type Adjusted = Float;
    fn adjust_precision(&self) -> Self::Adjusted {
        #[cfg(feature = "f64")]
        return (*self).into();
        #[cfg(not(feature = "f64"))]
        return *self;
    }
}

impl AdjustPrecision for Vec3 {
    type Adjusted = Vector3;
    fn adjust_precision(&self) -> Self::Adjusted {
        #[cfg(feature = "f64")]
        return self.as_dvec3();
        #[cfg(not(feature = "f64"))]
        return *self;
    }
}

impl AdjustPrecision for Quat {
    type Adjusted = Quaternion;
    fn adjust_precision(&self) -> Self::Adjusted {
        #[cfg(feature = "f64")]
        return self.as_dquat();
        #[cfg(not(feature = "f64"))]
        return *self;
    }
}

/// Adjust the precision down to `f32` regardless of compilation.
pub trait AsF32 {
    type F32;
    fn f32(&self) -> Self::F32;
}

impl AsF32 for Vec3 {
    type F32 = Self;
    fn f32(&self) -> Self::F32 {
        *self
    }
}

#[cfg(feature = "f64")]
impl AsF32 for DVec3 {
    type F32 = Vec3;
    fn f32(&self) -> Self::F32 {
        self.as_vec3()
    }
}

impl AsF32 for Quat {
    type F32 = Self;
    fn f32(&self) -> Self::F32 {
        *self
    }
}

#[cfg(feature = "f64")]
impl AsF32 for DQuat {
    type F32 = Quat;
    fn f32(&self) -> Self::F32 {
        self.as_quat()
    }
}

impl AsF32 for f32 {
    type F32 = f32;
    fn f32(&self) -> Self::F32 {
        *self
    }
}

#[cfg(feature = "f64")]
impl AsF32 for f64 {
    type F32 = f32;
    fn f32(&self) -> Self::F32 {
        *self as f32
    }
}

/// The component of `vector` that lies on the plane whose normal is `normal`.
///
/// `normal` does not need to be normalized, but must not be zero.
pub fn project_on_plane(vector: Vector3, normal: Vector3) -> Vector3 {
    vector.reject_from(normal)
}

/// The unsigned angle between two vectors, in degrees.
///
/// Returns `0.0` if either vector is zero.
pub fn angle_between_degrees(a: Vector3, b: Vector3) -> Float {
    if a == Vector3::ZERO || b == Vector3::ZERO {
        return 0.0;
    }
    a.angle_between(b).to_degrees()
}

/// Drop the vertical component of a vector (assuming `Y` is up).
pub fn horizontal(vector: Vector3) -> Vector3 {
    Vector3::new(vector.x, 0.0, vector.z)
}
