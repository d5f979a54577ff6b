/// The fixed primitive operations and the table that reserves their names.
pub mod primitives;

/// Native words making up the demonstration host surface.
pub mod host_words;
