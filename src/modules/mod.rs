pub mod color_swap;
pub mod guid_ops;
pub mod sequence_pack;
pub mod tex_convert;
