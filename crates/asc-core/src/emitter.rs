//! The bytecode sink each unit generates into.

/// Receives generated code for one or more units and serializes it.
pub trait Emitter {
    /// Serialize everything emitted so far, appending to `out`.
    fn emit(&self, out: &mut Vec<u8>);

    /// Number of methods implemented natively.
    fn native_method_count(&self) -> usize;

    fn class_count(&self) -> usize;

    fn script_count(&self) -> usize;

    /// Move the first script to the end, so it initializes last.
    fn reorder_main_script(&mut self);

    /// Mark the output as carrying API version metadata.
    fn enable_api_versioning(&mut self);

    /// C header text declaring native classes and methods.
    fn native_header(&self) -> String {
        String::new()
    }
}
