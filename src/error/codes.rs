/// Error code registry for evalfleet
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Partition errors
/// - 3000-3999: Queue errors
/// - 4000-4999: Storage errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;

    // Partition errors (2000-2999)
    pub const PARTITION_GENERIC: u16 = 2000;
    pub const PARTITION_EMPTY_INPUT: u16 = 2001;
    pub const PARTITION_INVALID_JOB_ID: u16 = 2002;
    pub const PARTITION_DUPLICATE_SCENARIO: u16 = 2003;
    pub const PARTITION_SERIALIZATION: u16 = 2004;

    // Queue errors (3000-3999)
    pub const QUEUE_GENERIC: u16 = 3000;
    pub const QUEUE_CLOSED: u16 = 3001;
    pub const QUEUE_EMPTY: u16 = 3002;
    pub const QUEUE_ITEM_NOT_FOUND: u16 = 3003;
    pub const QUEUE_JOB_NOT_FOUND: u16 = 3004;
    pub const QUEUE_INVALID_JOB_ID: u16 = 3005;
    pub const QUEUE_DUPLICATE_ITEM: u16 = 3006;

    // Storage errors (4000-4999)
    pub const STORAGE_GENERIC: u16 = 4000;
    pub const STORAGE_IO_ERROR: u16 = 4001;
    pub const STORAGE_NOT_FOUND: u16 = 4004;
    pub const STORAGE_CLOSED: u16 = 4005;
    pub const STORAGE_INVALID_JOB_ID: u16 = 4006;
    pub const STORAGE_SERIALIZATION_ERROR: u16 = 4011;
    pub const STORAGE_CONFIGURATION: u16 = 4012;

    pub const OTHER_GENERIC: u16 = 9000;
}

/// Short human-readable description of an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "Configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_INVALID_YAML => "Configuration file is not valid YAML",
        ErrorCode::CONFIG_INVALID_VALUE => "Configuration value is invalid",
        ErrorCode::PARTITION_GENERIC => "Partition error",
        ErrorCode::PARTITION_EMPTY_INPUT => "No scenarios or no providers to partition",
        ErrorCode::PARTITION_INVALID_JOB_ID => "Job id is empty",
        ErrorCode::PARTITION_DUPLICATE_SCENARIO => "Two scenarios share the same id",
        ErrorCode::PARTITION_SERIALIZATION => "Work item config could not be serialized",
        ErrorCode::QUEUE_GENERIC => "Queue error",
        ErrorCode::QUEUE_CLOSED => "Queue has been closed",
        ErrorCode::QUEUE_EMPTY => "No pending work items",
        ErrorCode::QUEUE_ITEM_NOT_FOUND => "Work item is not being processed",
        ErrorCode::QUEUE_JOB_NOT_FOUND => "Job has never been pushed",
        ErrorCode::QUEUE_INVALID_JOB_ID => "Job id is empty",
        ErrorCode::QUEUE_DUPLICATE_ITEM => "Work item id already pushed to the job",
        ErrorCode::STORAGE_GENERIC => "Storage error",
        ErrorCode::STORAGE_IO_ERROR => "Storage I/O failure",
        ErrorCode::STORAGE_NOT_FOUND => "Result not found",
        ErrorCode::STORAGE_CLOSED => "Storage has been closed",
        ErrorCode::STORAGE_INVALID_JOB_ID => "Job id is empty or not a valid key",
        ErrorCode::STORAGE_SERIALIZATION_ERROR => "Result could not be serialized",
        ErrorCode::STORAGE_CONFIGURATION => "Storage backend misconfigured",
        _ => "Unknown error",
    }
}
