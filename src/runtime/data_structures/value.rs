use std::{ any::Any,
           fmt::{ self,
                  Debug,
                  Display,
                  Formatter },
           rc::Rc };
use crate::runtime::data_structures::environment::EnvironmentPtr;



/// An object owned by the embedding host.  Scripts can only move these around the stack and
/// compare them by identity, host words downcast them back to their concrete type.
#[derive(Clone)]
pub struct HostRef
{
    /// A readable tag for the object, used when it is displayed.
    name: String,
    object: Rc<dyn Any>
}


impl HostRef
{
    pub fn new(name: &str, object: Rc<dyn Any>) -> HostRef
    {
        HostRef { name: name.to_string(), object }
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T>
    {
        self.object.downcast_ref::<T>()
    }

    /// Do both references point at the same host object?
    pub fn same_object(&self, other: &HostRef) -> bool
    {
        std::ptr::addr_eq(Rc::as_ptr(&self.object), Rc::as_ptr(&other.object))
    }
}



/// A single element of the data stack.
#[derive(Clone)]
pub enum Value
{
    /// Numbers are always double precision floats.
    Number(f64),

    Bool(bool),

    String(String),

    /// A scope closed by `endpackage`.  Shared by reference, the frame is not copied.
    Environment(EnvironmentPtr),

    /// An opaque object handed out by a host word.
    Host(HostRef)
}


/// Strict equality.  Values of different variants are never equal and the reference variants
/// compare by identity.
impl PartialEq for Value
{
    fn eq(&self, other: &Value) -> bool
    {
        match ( self, other )
        {
            ( Value::Number(a),      Value::Number(b)      ) => a == b,
            ( Value::Bool(a),        Value::Bool(b)        ) => a == b,
            ( Value::String(a),      Value::String(b)      ) => a == b,
            ( Value::Environment(a), Value::Environment(b) ) => Rc::ptr_eq(a, b),
            ( Value::Host(a),        Value::Host(b)        ) => a.same_object(b),

            _                                                => false
        }
    }
}


impl Display for Value
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match self
        {
            Value::Number(value) if value.is_infinite() =>
                {
                    write!(f, "{}Infinity", if *value < 0.0 { "-" } else { "" })
                },

            Value::Number(value)      => write!(f, "{}", value),
            Value::Bool(value)        => write!(f, "{}", value),
            Value::String(value)      => write!(f, "{}", value),
            Value::Environment(value) => write!(f, "package{{{}}}", value.local_names().join(", ")),
            Value::Host(value)        => write!(f, "<host {}>", value.name())
        }
    }
}


/// Same as display, except strings are quoted so they can be told apart from numbers.
impl Debug for Value
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match self
        {
            Value::String(value) => write!(f, "{:?}", value),
            _                    => write!(f, "{}", self)
        }
    }
}


/// Define implementations for converting between Values and the raw data types they represent.
macro_rules! value_conversion
{
    ($data_type:ty , $variant:ident , $as_ident:ident) =>
    {
        impl Value
        {
            #[doc = concat!("Borrow the contained ", stringify!($data_type), " if that is what the value holds.")]
            pub fn $as_ident(&self) -> Option<&$data_type>
            {
                match self
                {
                    Value::$variant(value) => Some(value),
                    _ => None
                }
            }
        }


        #[doc = concat!("Allow conversion from ", stringify!($data_type), " to a Value.")]
        impl From<$data_type> for Value
        {
            fn from(original: $data_type) -> Value
            {
                Value::$variant(original)
            }
        }
    };
}


value_conversion!(f64,            Number,      as_number);
value_conversion!(bool,           Bool,        as_bool);
value_conversion!(String,         String,      as_string);
value_conversion!(EnvironmentPtr, Environment, as_environment);
value_conversion!(HostRef,        Host,        as_host);


impl From<&str> for Value
{
    fn from(original: &str) -> Value
    {
        Value::String(original.to_string())
    }
}


impl Value
{
    /// Whether the value counts as true when tested by `if` or negated by `not`.  False, zero, NaN
    /// and the empty string are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool
    {
        match self
        {
            Value::Number(value) => *value != 0.0 && !value.is_nan(),
            Value::Bool(value)   => *value,
            Value::String(value) => !value.is_empty(),
            _                    => true
        }
    }

    /// Name of the value's type for error messages.
    pub fn type_name(&self) -> &'static str
    {
        match self
        {
            Value::Number(_)      => "number",
            Value::Bool(_)        => "boolean",
            Value::String(_)      => "string",
            Value::Environment(_) => "package",
            Value::Host(_)        => "host object"
        }
    }
}
