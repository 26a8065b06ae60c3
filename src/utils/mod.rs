pub mod constants;
pub mod img_stuffs;
