//! Board and protocol constants shared by the engine-side library.

// Arena
pub const ARENA_SIZE: i32 = 28;
pub const HALF_ARENA: i32 = 14;

// Resource slots in `[SP, MP]` pairs
pub const SP: usize = 0;
pub const MP: usize = 1;

// Player indices as seen by the algo (the engine always reports us as p1)
pub const PLAYER_SELF: u8 = 0;
pub const PLAYER_ENEMY: u8 = 1;

// Owner flag inside raw action-frame events (1 = us, 2 = opponent)
pub const FRAME_OWNER_SELF: i64 = 1;

// A unit with range r affects every cell whose center lies within r + 0.51
pub const RANGE_INCLUSION_SLACK: f64 = 0.51;

// `unitInformation` layout
pub const UNIT_INFORMATION_LEN: usize = 8;
pub const UNIT_LIST_COUNT: usize = 8;

// turnInfo[0] phase codes
pub const PHASE_DEPLOY: i64 = 0;
pub const PHASE_ACTION: i64 = 1;
pub const PHASE_END: i64 = 2;

// Guard against pathing walks that fail to converge
pub const MAX_PATH_STEPS: usize = (ARENA_SIZE * ARENA_SIZE) as usize;
