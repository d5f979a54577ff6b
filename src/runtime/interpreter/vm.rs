use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};

/// Word calls may nest this deep before the run is aborted.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Tunable limits of the virtual machine.
#[derive(Clone, Debug)]
pub struct VmOptions {
    /// Maximum number of nested word calls.  Runaway recursion fails with a call depth error
    /// instead of overflowing the native stack.
    pub max_call_depth: usize,
}

impl Default for VmOptions {
    fn default() -> Self {
        VmOptions {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// The machine programs run on.  The primitive set itself is fixed, the VM carries the settings
/// and the diagnostic sink that `spew` writes to.
pub struct Vm {
    options: VmOptions,
    sink: Box<dyn Write>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    /// A VM with default options writing diagnostics to standard output.
    pub fn new() -> Vm {
        Vm::with_sink(VmOptions::default(), Box::new(io::stdout()))
    }

    pub fn with_sink(options: VmOptions, sink: Box<dyn Write>) -> Vm {
        Vm { options, sink }
    }

    pub fn options(&self) -> &VmOptions {
        &self.options
    }

    pub fn sink(&mut self) -> &mut dyn Write {
        self.sink.as_mut()
    }
}

/// An in-memory diagnostic sink.  Clones share the same buffer, so one clone can be handed to the
/// VM while another is kept to read what was written.
#[derive(Clone, Default)]
pub struct CaptureBuffer {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> CaptureBuffer {
        CaptureBuffer::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).to_string()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
