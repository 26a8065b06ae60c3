pub static MIN_CELL_SIZE: u32 = 2;

pub static SHEET_SUFFIX: &str = "-sheet";

pub static DEFAULT_JPG_QUALITY: u8 = 75;

pub static CONVERTIBLE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tga", "exr"];

pub static GUID_LEN: usize = 32;

// text-based asset files that may hold `guid: <hex>` references
pub static GUID_REFERENCE_EXTENSIONS: &[&str] = &[
    "prefab",
    "mat",
    "unity",
    "controller",
    "vfx",
    "shadergraph",
    "asset",
];
