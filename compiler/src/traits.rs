use protoboil_ir::Ir;

use crate::error::GeneratorError;

/// A generator module: reads the IR and returns the text of exactly one
/// artifact. `proto` is the originating proto file when the template list
/// bound one to this generator.
///
/// Plain functions and closures with the same shape are generators too:
///
/// ```
/// use protoboil_compiler::{Generator, GeneratorError};
/// use protoboil_ir::{Config, Ir};
///
/// let hello = |_: &Ir, _: Option<&str>| -> Result<String, GeneratorError> {
///     Ok("// Hello world!\n".to_string())
/// };
/// assert_eq!(hello.generate(&Ir::new(Config::default()), None).unwrap(), "// Hello world!\n");
/// ```
pub trait Generator {
    fn generate(&self, ir: &Ir, proto: Option<&str>) -> Result<String, GeneratorError>;
}

impl<F> Generator for F
where
    F: Fn(&Ir, Option<&str>) -> Result<String, GeneratorError>,
{
    fn generate(&self, ir: &Ir, proto: Option<&str>) -> Result<String, GeneratorError> {
        self(ir, proto)
    }
}
