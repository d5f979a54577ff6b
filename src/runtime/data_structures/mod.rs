/// Module contains the Value enumeration, the elements of the data stack.
pub mod value;

/// The chained word scopes created by `package` and the word entries they hold.
pub mod environment;
