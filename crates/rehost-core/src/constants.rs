//! Defaults shared across crates.

/// Folder used by the batch uploader when the caller does not pick one.
pub const DEFAULT_BATCH_FOLDER: &str = "generation/inputs";

/// Upload path used by the remote rehoster when the caller does not pick one.
pub const DEFAULT_REHOST_PATH: &str = "media";

/// Extension used when neither the source nor the content type tells us better.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Length of generated identifiers. Matches the primary key width of the
/// user and media tables (`varchar(21)`).
pub const ID_LENGTH: usize = 21;

/// URL-safe alphabet used for generated identifiers.
pub const ID_ALPHABET: &[u8] =
    b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";
