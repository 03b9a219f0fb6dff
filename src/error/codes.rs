/// Error code registry for the pacemaker engine
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors (incomplete reference data, bad settings)
/// - 2000-2999: Validation errors
/// - 3000-3999: Storage errors
/// - 4000-4999: Reasoning service errors
/// - 5000-5999: Job / state machine errors
/// - 6000-6999: Quota errors
/// - 9000-9999: Other errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;
    pub const CONFIG_MISSING_PACE: u16 = 1010;
    pub const CONFIG_MISSING_TEMPLATE: u16 = 1011;
    pub const CONFIG_MISSING_REFERENCE: u16 = 1012;
    pub const CONFIG_CATALOG_PARSE: u16 = 1013;

    // Validation errors (2000-2999)
    pub const VALIDATION_GENERIC: u16 = 2000;
    pub const VALIDATION_OUT_OF_RANGE: u16 = 2001;
    pub const VALIDATION_MALFORMED_PACE: u16 = 2002;
    pub const VALIDATION_MALFORMED_SET: u16 = 2003;
    pub const VALIDATION_INVALID_CONDITION: u16 = 2004;
    pub const VALIDATION_INVALID_REQUEST: u16 = 2005;

    // Storage errors (3000-3999)
    pub const STORAGE_GENERIC: u16 = 3000;
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_BACKEND_ERROR: u16 = 3010;
    pub const STORAGE_SERIALIZATION_ERROR: u16 = 3011;

    // Reasoning service errors (4000-4999)
    pub const REASONING_GENERIC: u16 = 4000;
    pub const REASONING_REQUEST_FAILED: u16 = 4001;
    pub const REASONING_TIMEOUT: u16 = 4002;
    pub const REASONING_RATE_LIMITED: u16 = 4003;
    pub const REASONING_UNAUTHORIZED: u16 = 4004;
    pub const REASONING_INVALID_RESPONSE: u16 = 4005;
    pub const REASONING_PROMPT_RENDER: u16 = 4006;

    // Job errors (5000-5999)
    pub const JOB_GENERIC: u16 = 5000;
    pub const JOB_NOT_FOUND: u16 = 5001;
    pub const JOB_INVALID_TRANSITION: u16 = 5002;

    // Quota errors (6000-6999)
    pub const QUOTA_EXCEEDED: u16 = 6001;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_INVALID_TOML => "Configuration file is not valid TOML",
        ErrorCode::CONFIG_INVALID_VALUE => "Configuration value is invalid",
        ErrorCode::CONFIG_MISSING_PACE => "Pace table has no entry for the requested VDOT and type",
        ErrorCode::CONFIG_MISSING_TEMPLATE => "Workout catalog has no template for the running type",
        ErrorCode::CONFIG_MISSING_REFERENCE => "VDOT reference table is empty",
        ErrorCode::CONFIG_CATALOG_PARSE => "Catalog data could not be parsed",

        ErrorCode::VALIDATION_GENERIC => "General validation error",
        ErrorCode::VALIDATION_OUT_OF_RANGE => "Value is outside its allowed range",
        ErrorCode::VALIDATION_MALFORMED_PACE => "Pace is not in mm:ss or mm.ss form",
        ErrorCode::VALIDATION_MALFORMED_SET => "Workout set must declare exactly one of duration or distance",
        ErrorCode::VALIDATION_INVALID_CONDITION => "Condition must be an ordinal between 1 and 5",
        ErrorCode::VALIDATION_INVALID_REQUEST => "Plan request is invalid",

        ErrorCode::STORAGE_GENERIC => "General storage error",
        ErrorCode::STORAGE_IO_ERROR => "Storage I/O error",
        ErrorCode::STORAGE_BACKEND_ERROR => "Storage backend error",
        ErrorCode::STORAGE_SERIALIZATION_ERROR => "Failed to serialize stored data",

        ErrorCode::REASONING_GENERIC => "General reasoning service error",
        ErrorCode::REASONING_REQUEST_FAILED => "Reasoning service request failed",
        ErrorCode::REASONING_TIMEOUT => "Reasoning stage timed out",
        ErrorCode::REASONING_RATE_LIMITED => "Reasoning service rate limit exceeded",
        ErrorCode::REASONING_UNAUTHORIZED => "Reasoning service rejected the credentials",
        ErrorCode::REASONING_INVALID_RESPONSE => "Reasoning service returned an unusable reply",
        ErrorCode::REASONING_PROMPT_RENDER => "Prompt template failed to render",

        ErrorCode::JOB_GENERIC => "General job error",
        ErrorCode::JOB_NOT_FOUND => "Pacemaker job not found",
        ErrorCode::JOB_INVALID_TRANSITION => "Processing status transition not allowed",

        ErrorCode::QUOTA_EXCEEDED => "Daily pacemaker quota exhausted",

        _ => "Unknown error",
    }
}
