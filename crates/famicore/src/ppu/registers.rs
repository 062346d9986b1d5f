pub(crate) mod control;
pub(crate) mod mask;
pub(crate) mod status;
pub mod vram_addr;

pub(crate) use control::Control;
pub(crate) use mask::Mask;
pub(crate) use status::Status;
pub use vram_addr::VramAddr;
