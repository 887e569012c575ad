// =============================================================================
// Shabbat Matches Backend Constants
// =============================================================================
// This file contains all constants used throughout the backend to enable
// easy tuning and configuration from a single location.

// =============================================================================
// PROFILE VALIDATION
// =============================================================================

/// Youngest age accepted on a profile unless PROFILE_MIN_AGE overrides it
pub const DEFAULT_MIN_AGE: i32 = 18;

/// Oldest age accepted on a profile unless PROFILE_MAX_AGE overrides it
pub const DEFAULT_MAX_AGE: i32 = 120;

/// Maximum characters in a display name
pub const NAME_CHAR_LIMIT: usize = 100;

/// Maximum characters in a bio
pub const BIO_CHAR_LIMIT: usize = 2000;

/// Shortest accepted phone number (formatting characters included)
pub const PHONE_MIN_LENGTH: usize = 7;

/// Longest accepted phone number (formatting characters included)
pub const PHONE_MAX_LENGTH: usize = 20;

// =============================================================================
// MEDIA STORAGE
// =============================================================================

/// Storage bucket holding profile pictures
pub const PROFILE_PICTURE_BUCKET: &str = "profile-pictures";

/// Folder inside the bucket that picture objects are written to
pub const PROFILE_PICTURE_FOLDER: &str = "profiles";

/// Largest picture upload accepted by the server
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Cookie carrying the provider access token for browser clients
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Where unauthenticated callers are sent
pub const LOGIN_PATH: &str = "/login";

/// Where callers without a profile are sent
pub const PROFILE_COMPLETION_PATH: &str = "/profile";

/// Default landing page after email verification
pub const DEFAULT_CALLBACK_NEXT: &str = "/profile";

/// Path the identity provider redirects verification links to
pub const AUTH_CALLBACK_PATH: &str = "/auth/callback";

/// Timeout for calls to the identity provider and media store
pub const UPSTREAM_TIMEOUT_SECS: u64 = 15;

// =============================================================================
// MATCH EVENTS
// =============================================================================

/// Buffered match events per broadcast subscriber before lagging
pub const MATCH_EVENT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default public site URL used to build verification redirects
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
