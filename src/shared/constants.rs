/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum length of a stored media name
pub const MAX_MEDIA_NAME_LENGTH: usize = 255;
