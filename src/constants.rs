/// Expected database schema version
/// Stored under the `version` key of the metadata table
pub const EXPECTED_DB_VERSION: &str = "2";

/// Multipart field carrying the uploaded audio file
pub const FILE_FIELD: &str = "audioFile";

/// Multipart field carrying the language tag
pub const LANGUAGE_FIELD: &str = "language";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_DIR: &str = "public/uploads/audio";
pub const DEFAULT_PUBLIC_URL_PREFIX: &str = "/uploads/audio";
pub const DEFAULT_SQLITE_PATH: &str = "data/voice_audio.sqlite";

/// Upload body limit in megabytes when the config does not set one
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 200;

/// Stem used when nothing survives filename sanitization
pub const FALLBACK_FILE_STEM: &str = "audio";

/// How many timestamp bumps to try before giving up on a free file name
pub const MAX_NAME_ATTEMPTS: i64 = 16;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";
pub const NOT_FOUND_MESSAGE: &str = "No audio file found for the specified language.";
pub const MISSING_FIELDS_MESSAGE: &str = "Missing file or language field.";
