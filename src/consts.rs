// Runtime parameters
pub const NUM_THREADS: usize = 3;
pub const OUT_FILE: &'static str = "./out.ppm";

// Floating point comparisons
pub const FEQ_EPSILON: f32 = 0.0001;

// Rays that travel further than this are treated as misses.
pub const RAY_MISS_DISTANCE: f32 = 100000.0;

// Default viewing volume
pub const PERSPECTIVE_NEAR: f32 = 1.0;
pub const PERSPECTIVE_FAR: f32 = 100.0;
pub const PERSPECTIVE_FOV_DEGREES: f32 = 75.0;
pub const VIEWPORT_WIDTH: f32 = 800.0;
pub const VIEWPORT_HEIGHT: f32 = 600.0;

// Largest viewport side, in pixels.
pub const VIEWPORT_MAX: f32 = 16384.0;

// Quadtree subdivision
pub const QUADTREE_MAX_PER_NODE: usize = 1;
pub const QUADTREE_MAX_DEPTH: u32 = 8;

// Culling demo
pub const CRATE_SPREAD: f32 = 50.0;
