use std::fmt;

/// Output builder handed to generators: collects text line by line under a
/// stack of indentation prefixes.
///
/// ```
/// use protoboil_ir::Emitter;
///
/// let mut out = Emitter::new();
/// out.line("message A {");
/// out.indented(|out| {
///     out.line("int32 x = 1;");
/// });
/// out.line("}");
/// assert_eq!(out.finish(), "message A {\n    int32 x = 1;\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct Emitter {
    buffer: String,
    unit:   String,
    depth:  usize,
}

impl Default for Emitter {
    fn default() -> Self {
        Emitter::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Emitter::with_unit("    ")
    }

    /// An emitter whose indentation step is `unit` instead of four spaces.
    pub fn with_unit(unit: &str) -> Self {
        Emitter {
            buffer: String::new(),
            unit:   unit.to_string(),
            depth:  0,
        }
    }

    pub fn prefix(&self) -> String {
        self.unit.repeat(self.depth)
    }

    /// Appends one indented line.
    pub fn line<S: AsRef<str>>(&mut self, text: S) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            let prefix = self.prefix();
            self.buffer.push_str(&prefix);
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Appends a multi-line literal, indenting each non-empty line. A single
    /// leading newline is dropped so raw strings can start on their own line.
    pub fn block<S: AsRef<str>>(&mut self, text: S) -> &mut Self {
        let text = text.as_ref();
        let text = text.strip_prefix('\n').unwrap_or(text);
        let prefix = self.prefix();
        for line in text.split_inclusive('\n') {
            if line != "\n" {
                self.buffer.push_str(&prefix);
            }
            self.buffer.push_str(line);
        }
        self
    }

    /// Appends text verbatim: no prefix, no newline.
    pub fn text<S: AsRef<str>>(&mut self, text: S) -> &mut Self {
        self.buffer.push_str(text.as_ref());
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    /// Runs `f` one indentation level deeper.
    pub fn indented<F: FnOnce(&mut Self)>(&mut self, f: F) -> &mut Self {
        self.indent();
        f(self);
        self.dedent()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

impl fmt::Write for Emitter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buffer.push_str(s);
        Ok(())
    }
}
