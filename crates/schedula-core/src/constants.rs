/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

/// Idempotency key headers; the first present wins.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";
pub const IDEMPOTENCY_KEY_HEADER_ALT: &str = "x-idempotency-key";

/// Caller-supplied per-request deadline, in milliseconds.
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout-ms";

/// Maximum accepted idempotency key length, in bytes, after trimming.
pub const MAX_IDEMPOTENCY_KEY_BYTES: usize = 256;

/// Maximum appointment and occurrence duration.
pub const MAX_APPOINTMENT_DURATION_SECS: i64 = 24 * 60 * 60;

/// Forward horizon over which series-vs-calendar conflicts are evaluated.
pub const CONFLICT_LOOKAHEAD_DAYS: i64 = 180;

/// Buffer applied around exception lookups so overrides whose original
/// occurrence falls just outside the query window are still honored.
pub const EXCEPTION_WINDOW_BUFFER_DAYS: i64 = 14;
