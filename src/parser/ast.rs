//! Syntax tree types for template text

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Placeholder name (alphanumeric plus `_`, `-` and `.`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directive argument: `key=value` or a positional `value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub key: Option<Identifier>,
    pub value: String,
}

impl Argument {
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }

    pub fn named(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(Identifier::new(key)),
            value: value.into(),
        }
    }
}

/// Arguments are handed to functions in their `key=value` form
impl std::fmt::Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}={}", key, self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Look up the last argument with the given key
pub fn find_argument<'a>(args: &'a [Argument], key: &str) -> Option<&'a str> {
    args.iter()
        .rev()
        .find(|a| a.key.as_ref().is_some_and(|k| k.as_str() == key))
        .map(|a| a.value.as_str())
}

/// The parsed body of a `${...}` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `${<name>}`
    OpenBlock(Spanned<Identifier>),
    /// `${</name>}`
    CloseBlock(Spanned<Identifier>),
    /// `${name ...}` or `${fun:arg ...}`
    Reference(Reference),
}

/// Variable or function reference
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: Spanned<Identifier>,
    /// Argument after the colon, present for function calls
    pub function_arg: Option<String>,
    pub arguments: Vec<Argument>,
}

impl Reference {
    /// Whether this reference uses the `fun:arg` form
    pub fn is_function(&self) -> bool {
        self.function_arg.is_some()
    }

    /// Arguments as handed to a function: the colon argument first
    pub fn function_args(&self) -> Vec<String> {
        self.function_arg
            .iter()
            .cloned()
            .chain(self.arguments.iter().map(|a| a.to_string()))
            .collect()
    }
}

/// One piece of scanned template text
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text, with `$${` already unescaped
    Literal(String),
    /// A placeholder, plus its source text as written
    Directive { directive: Directive, source: String },
}
