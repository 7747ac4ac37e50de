//! protoboil
//!
//! Everything a generator module needs:
//!
//! - The IR types, the query facade and the `Emitter` (re-exported from
//!   `protoboil-ir`)
//! - The `Generator` trait and `GeneratorError` (re-exported from the compiler)
//! - `serve`, which turns a generator into the executable the plugin runs as
//!   `<program> <snapshot> [<proto>]`

use std::ffi::OsString;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::process::ExitCode;

use tracing::error;

pub use protoboil_compiler::catalog::INTEGRITY_EXIT_CODE;
pub use protoboil_compiler::error::GeneratorError;
pub use protoboil_compiler::traits::Generator;
pub use protoboil_ir::*;

/// Loads the snapshot at `snapshot` and runs `generator` over it.
pub fn run<G: Generator + ?Sized>(generator: &G, snapshot: &Path, proto: Option<&str>) -> Result<String, GeneratorError> {
    let ir = Ir::load(snapshot)?;
    generator.generate(&ir, proto)
}

/// Main loop of a generator executable. Reads `<snapshot> [<proto>]` from
/// the command line and prints the artifact to stdout. A lookup of a missing
/// id exits with [`INTEGRITY_EXIT_CODE`], which aborts the plugin run.
///
/// ```no_run
/// use protoboil::{serve, GeneratorError, Ir};
///
/// fn main() -> std::process::ExitCode {
///     serve(|ir: &Ir, _: Option<&str>| -> Result<String, GeneratorError> {
///         Ok(format!("{} files\n", ir.decl().len()))
///     })
/// }
/// ```
pub fn serve<G: Generator>(generator: G) -> ExitCode {
    serve_args(&generator, std::env::args_os().skip(1))
}

/// [`serve`] over an explicit argument list (program name excluded).
pub fn serve_args<G, I>(generator: &G, args: I) -> ExitCode
where
    G: Generator + ?Sized,
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let Some(snapshot) = args.next() else {
        eprintln!("usage: <generator> <snapshot> [<proto>]");
        return ExitCode::from(2);
    };
    let proto = args.next().map(|p| p.to_string_lossy().into_owned());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(generator, Path::new(&snapshot), proto.as_deref())));
    let text = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            error!("{}", err);
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
        Err(payload) if is_dangling_id(payload.as_ref()) => return ExitCode::from(INTEGRITY_EXIT_CODE),
        Err(payload) => panic::resume_unwind(payload),
    };

    let mut stdout = io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Unable to write the output: {}", err);
            ExitCode::FAILURE
        }
    }
}

pub mod traits {
    pub use protoboil_compiler::traits::Generator;
}

pub mod error {
    pub use protoboil_compiler::error::GeneratorError;
    pub use protoboil_ir::IrError;
}
