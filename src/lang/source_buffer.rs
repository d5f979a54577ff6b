use std::{ fmt::{ self,
                  Display,
                  Formatter },
           iter::Peekable,
           str::Chars };



/// Where a token, or a native word registration, came from.  Used throughout the compiler and the
/// runtime so that errors can point back at the offending text.
///
/// This is a read-only structure.  Use the field accessor methods to get the values.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SourceLocation
{
    /// Either the path to the file or a tag describing the source, for example "\<eval\>".
    path: String,

    /// The 1 based line number.
    line: usize,

    /// The 1 based column number.
    column: usize
}


impl Default for SourceLocation
{
    fn default() -> Self
    {
        SourceLocation::new_from_path("unspecified")
    }
}


impl Display for SourceLocation
{
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result
    {
        write!(formatter, "{} ({}, {})", self.path, self.line, self.column)
    }
}


impl SourceLocation
{
    /// A location at the very start of the given source.
    pub fn new_from_path(path: &str) -> SourceLocation
    {
        SourceLocation { path: path.to_owned(), line: 1, column: 1 }
    }

    /// Create a location with all of the needed information.  Used by the location_here! macro.
    pub fn new_from_info(path: &str, line: usize, column: usize) -> SourceLocation
    {
        SourceLocation { path: path.to_owned(), line, column }
    }

    pub fn path(&self) -> &str
    {
        &self.path
    }

    pub fn line(&self) -> usize
    {
        self.line
    }

    pub fn column(&self) -> usize
    {
        self.column
    }
}



/// Get the location of the macro invocation within the Rust source.  Native words registered from
/// Rust use this as their definition site.
#[macro_export]
macro_rules! location_here
{
    () =>
    {
        $crate::lang::source_buffer::SourceLocation::new_from_info(file!(),
                                                                   line!() as usize,
                                                                   column!() as usize)
    };
}



/// Forward only cursor over a borrowed source string that keeps track of the line and column of
/// the next character to be consumed.
pub struct SourceBuffer<'a>
{
    chars: Peekable<Chars<'a>>,
    location: SourceLocation
}


impl<'a> SourceBuffer<'a>
{
    pub fn new(path: &str, source: &'a str) -> SourceBuffer<'a>
    {
        SourceBuffer
            {
                chars: source.chars().peekable(),
                location: SourceLocation::new_from_path(path)
            }
    }

    /// The location of the next character to be consumed.
    pub fn location(&self) -> &SourceLocation
    {
        &self.location
    }

    /// Look at the next character without consuming it.
    pub fn peek_next(&mut self) -> Option<char>
    {
        self.chars.peek().copied()
    }

    /// Consume the next character, advancing the location past it.
    pub fn next_char(&mut self) -> Option<char>
    {
        let next = self.chars.next()?;

        if next == '\n'
        {
            self.location.line += 1;
            self.location.column = 1;
        }
        else
        {
            self.location.column += 1;
        }

        Some(next)
    }
}
