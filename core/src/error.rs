use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_str = match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        };
        write!(f, "{}", level_str)
    }
}

/// Common surface of every diagnostic produced by the pipeline.
pub trait FunkyErrorExt {
    fn level(&self) -> Level;
    fn message(&self) -> String;
    fn issuer(&self) -> String;
    fn span(&self) -> Option<crate::location::Span>;
    fn location(&self) -> Option<crate::location::Location>;
}

/// Diagnostics produced by a stage that may report more than one problem.
pub type Diagnostics = Vec<Box<dyn FunkyErrorExt>>;

impl fmt::Debug for dyn FunkyErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc_str = match self.location() {
            Some(loc) => format!("{}:{}:{}", loc.file, loc.line, loc.column),
            None => "unknown".to_string(),
        };
        let span_str = match self.span() {
            Some(span) => span.to_string(),
            None => "span:none".to_string(),
        };

        write!(
            f,
            "FUNKYTREES | {} | {} | {} | {} | {}",
            self.level(),
            loc_str,
            self.issuer(),
            span_str,
            self.message()
        )
    }
}

impl fmt::Display for dyn FunkyErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Implements `Display`, `std::error::Error` and `FunkyErrorExt` for a
/// diagnostic struct carrying `level`, `message`, `issuer`, `location` and
/// `span` fields.
macro_rules! impl_funky_error {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if let Some(loc) = &self.location {
                    write!(f, "{} (at {})", self.message, loc)
                } else {
                    write!(f, "{}", self.message)
                }
            }
        }

        impl std::error::Error for $ty {}

        impl $crate::error::FunkyErrorExt for $ty {
            fn level(&self) -> $crate::error::Level {
                self.level
            }

            fn message(&self) -> String {
                self.message.clone()
            }

            fn issuer(&self) -> String {
                self.issuer.clone()
            }

            fn span(&self) -> Option<$crate::location::Span> {
                self.span.clone()
            }

            fn location(&self) -> Option<$crate::location::Location> {
                self.location.clone()
            }
        }
    };
}

pub(crate) use impl_funky_error;
