//! MCLF format constants.

// Intro
pub const MCLF_MAGIC: u32 = 0x464C_434D; // 'M' 'C' 'L' 'F' read little-endian
pub const MCLF_VERSION_MAJOR: u16 = 2;
pub const MCLF_INTRO_LEN: usize = 8;

// Full V2 header, through serviceVersion
pub const MCLF_HEADER_LEN: usize = 76;

// The text header follows the V2.3 header inside .text
pub const MCLF_HEADER_SIZE_V23: u32 = 0x80;

// Header field offsets
pub const OFF_MAGIC: usize = 0;
pub const OFF_VERSION_MINOR: usize = 4;
pub const OFF_VERSION_MAJOR: usize = 6;
pub const OFF_FLAGS: usize = 8;
pub const OFF_MEM_TYPE: usize = 12;
pub const OFF_SERVICE_TYPE: usize = 16;
pub const OFF_NUM_INSTANCES: usize = 20;
pub const OFF_UUID: usize = 24;
pub const OFF_DRIVER_ID: usize = 40;
pub const OFF_NUM_THREADS: usize = 44;
pub const OFF_TEXT_START: usize = 48;
pub const OFF_TEXT_LEN: usize = 52;
pub const OFF_DATA_START: usize = 56;
pub const OFF_DATA_LEN: usize = 60;
pub const OFF_BSS_LEN: usize = 64;
pub const OFF_ENTRY: usize = 68;
pub const OFF_SERVICE_VERSION: usize = 72;

pub const UUID_LEN: usize = 16;

// Service header flags
pub const MC_SERVICE_HEADER_FLAGS_PERMANENT: u32 = 1 << 0;
pub const MC_SERVICE_HEADER_FLAGS_NO_CONTROL_INTERFACE: u32 = 1 << 1;
pub const MC_SERVICE_HEADER_FLAGS_DEBUGGABLE: u32 = 1 << 2;
pub const MC_SERVICE_HEADER_FLAGS_EXTENDED_LAYOUT: u32 = 1 << 3;

// Data type names for the header structures
pub const HEADER_TYPE_V2: &str = "mclfHeader_t";
pub const HEADER_TYPE_V23: &str = "mclfHeaderV23_t";
pub const HEADER_TYPE_V24: &str = "mclfHeaderV24_t";
pub const TEXT_HEADER_TYPE: &str = "mclfTextHeader_t";
