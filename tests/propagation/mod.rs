/// Standard gravity in ft/s^2
pub(crate) const G0_FT_S2: f64 = 32.17;

mod config;
mod propagate;
mod quaternion;
