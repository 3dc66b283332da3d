// Floating point comparisons and surface offsets
pub const EPSILON: f64 = 0.00001;

// Rendering defaults, overridable from the scene file or the command line
pub const DEFAULT_RECURSION_DEPTH: usize = 5;
pub const DEFAULT_DIVIDE_THRESHOLD: usize = 8;
pub const DEFAULT_OUTPUT: &str = "./out.ppm";

// PPM limits
pub const PPM_MAX_LINE: usize = 70;
pub const PPM_MAX_VALUE: usize = 255;

// Common refraction indices
pub const VACUUM_RI: f64 = 1.0;
pub const AIR_RI: f64 = 1.00029;
pub const WATER_RI: f64 = 1.333;
pub const GLASS_RI: f64 = 1.5;
pub const DIAMOND_RI: f64 = 2.417;
