use lazy_static::lazy_static;
use regex::{Captures, Regex, RegexBuilder};

use crate::parser::Span;

/// A textual construct rejected before parsing.
#[derive(Debug)]
pub struct ForbiddenPattern {
    /// Stable short name, used in diagnostics and logs.
    pub name: &'static str,
    /// Human description of what the pattern catches.
    pub description: &'static str,
    regex: Regex,
    // Exempts a match, e.g. `import math`.
    allow: Option<fn(&Captures<'_>) -> bool>,
}

impl ForbiddenPattern {
    fn new(name: &'static str, description: &'static str, pattern: &str) -> Self {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("forbidden pattern must compile");
        Self {
            name,
            description,
            regex,
            allow: None,
        }
    }

    fn allowing(mut self, allow: fn(&Captures<'_>) -> bool) -> Self {
        self.allow = Some(allow);
        self
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Byte span of the first offending match, if any.
    pub fn find(&self, source: &str) -> Option<Span> {
        for caps in self.regex.captures_iter(source) {
            if self.allow.is_some_and(|allow| allow(&caps)) {
                continue;
            }
            let whole = caps.get(0)?;
            return Some(Span::new(whole.start(), whole.end()));
        }
        None
    }
}

fn is_math(module: Option<regex::Match<'_>>) -> bool {
    module.is_some_and(|m| m.as_str().eq_ignore_ascii_case("math"))
}

// `from M import N` is judged by M; a plain `import M` by M.
fn imports_math(caps: &Captures<'_>) -> bool {
    match caps.get(1) {
        Some(from_module) => is_math(Some(from_module)),
        None => is_math(caps.get(2)),
    }
}

fn from_math(caps: &Captures<'_>) -> bool {
    is_math(caps.get(1))
}

lazy_static! {
    /// Patterns checked in order; the first hit rejects the source.
    pub static ref FORBIDDEN_PATTERNS: Vec<ForbiddenPattern> = vec![
        ForbiddenPattern::new(
            "import",
            "import of a module other than math",
            r"(?:from\s+(\w*)\s+)?import\s+(\w*)",
        )
        .allowing(imports_math),
        ForbiddenPattern::new(
            "from-import",
            "import from a module other than math",
            r"from\s+(\w*)",
        )
        .allowing(from_math),
        ForbiddenPattern::new("dunder", "double-underscore name", r"__.*__"),
        ForbiddenPattern::new("exec", "call to exec()", r"exec\s*\("),
        ForbiddenPattern::new("eval", "call to eval()", r"eval\s*\("),
        ForbiddenPattern::new("compile", "call to compile()", r"\bcompile\s*\("),
        ForbiddenPattern::new("open", "file access through open()", r"open\s*\("),
        ForbiddenPattern::new("input", "console input through input()", r"input\s*\("),
        ForbiddenPattern::new("print", "console output through print()", r"print\s*\("),
        ForbiddenPattern::new("os", "access to the os module", r"\bos\."),
        ForbiddenPattern::new("sys", "access to the sys module", r"sys\."),
        ForbiddenPattern::new("subprocess", "reference to subprocess", r"subprocess"),
        ForbiddenPattern::new("socket", "reference to socket", r"socket"),
        ForbiddenPattern::new("file", "file access through file()", r"file\s*\("),
        ForbiddenPattern::new("breakpoint", "call to breakpoint()", r"\bbreakpoint\s*\("),
        ForbiddenPattern::new("globals", "namespace access through globals()", r"globals\s*\("),
        ForbiddenPattern::new("locals", "namespace access through locals()", r"\blocals\s*\("),
        ForbiddenPattern::new("vars", "namespace access through vars()", r"\bvars\s*\("),
        ForbiddenPattern::new("dir", "namespace access through dir()", r"\bdir\s*\("),
        ForbiddenPattern::new("getattr", "reflection through getattr()", r"\bgetattr\s*\("),
        ForbiddenPattern::new("setattr", "reflection through setattr()", r"\bsetattr\s*\("),
        ForbiddenPattern::new("delattr", "reflection through delattr()", r"\bdelattr\s*\("),
    ];
}
