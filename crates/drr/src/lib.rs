#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use drr_tensor as tensor;

#[doc(inline)]
pub use drr_lie as lie;

#[doc(inline)]
pub use drr_camera as camera;

#[doc(inline)]
pub use drr_volume as volume;

#[doc(inline)]
pub use drr_render as render;
