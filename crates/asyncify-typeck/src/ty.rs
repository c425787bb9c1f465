//! Type descriptors.
//!
//! A descriptor says whether an expression's runtime value is deferred (must
//! be awaited before use) and, when known, what it resolves to. Descriptors
//! are plain values compared structurally.

use std::fmt;

/// The descriptor of an expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    /// Nothing is known about the value.
    Unknown,
    /// An immediate value, optionally carrying its kind (`number`, `string`,
    /// ...) or a non-registry type name.
    Plain(Option<String>),
    /// An asynchronous result resolving to the inner descriptor.
    Deferred(Box<Ty>),
    /// A function of any arity returning the inner descriptor.
    Callable(Box<Ty>),
    /// A registry shape; members are looked up by name.
    Shape(String),
}

impl Ty {
    pub fn plain(kind: impl Into<String>) -> Ty {
        Ty::Plain(Some(kind.into()))
    }

    pub fn number() -> Ty {
        Ty::plain("number")
    }

    pub fn string() -> Ty {
        Ty::plain("string")
    }

    pub fn boolean() -> Ty {
        Ty::plain("boolean")
    }

    pub fn deferred(inner: Ty) -> Ty {
        Ty::Deferred(Box::new(inner))
    }

    pub fn callable(ret: Ty) -> Ty {
        Ty::Callable(Box::new(ret))
    }

    pub fn shape(name: impl Into<String>) -> Ty {
        Ty::Shape(name.into())
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Ty::Deferred(_))
    }

    /// Registry shape behind `Shape(S)` or `Deferred(Shape(S))`.
    pub fn shape_name(&self) -> Option<&str> {
        match self {
            Ty::Shape(name) => Some(name),
            Ty::Deferred(inner) => match inner.as_ref() {
                Ty::Shape(name) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    /// The descriptor after one level of awaiting.
    pub fn awaited(self) -> Ty {
        match self {
            Ty::Deferred(inner) => *inner,
            other => other,
        }
    }

    /// `a` if both descriptors agree, `Unknown` otherwise.
    pub fn common(a: &Ty, b: &Ty) -> Ty {
        if a == b {
            a.clone()
        } else {
            Ty::Unknown
        }
    }

    /// The shared descriptor of every item, or `Unknown` when they disagree
    /// or there are none.
    pub fn common_all<'a>(mut tys: impl Iterator<Item = &'a Ty>) -> Ty {
        let Some(first) = tys.next() else {
            return Ty::Unknown;
        };
        if tys.all(|t| t == first) {
            first.clone()
        } else {
            Ty::Unknown
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Unknown => write!(f, "unknown"),
            Ty::Plain(Some(kind)) => write!(f, "{kind}"),
            Ty::Plain(None) => write!(f, "plain"),
            Ty::Deferred(inner) => write!(f, "Deferred<{inner}>"),
            Ty::Callable(ret) => write!(f, "fn() -> {ret}"),
            Ty::Shape(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Ty::Unknown.to_string(), "unknown");
        assert_eq!(Ty::number().to_string(), "number");
        assert_eq!(Ty::Plain(None).to_string(), "plain");
        assert_eq!(
            Ty::callable(Ty::deferred(Ty::shape("Cursor"))).to_string(),
            "fn() -> Deferred<Cursor>"
        );
    }

    #[test]
    fn shape_name_sees_through_one_deferred_level() {
        assert_eq!(Ty::shape("Database").shape_name(), Some("Database"));
        assert_eq!(Ty::deferred(Ty::shape("Cursor")).shape_name(), Some("Cursor"));
        assert_eq!(Ty::deferred(Ty::deferred(Ty::shape("Cursor"))).shape_name(), None);
        assert_eq!(Ty::callable(Ty::shape("Cursor")).shape_name(), None);
    }

    #[test]
    fn awaiting_unwraps_once() {
        let ty = Ty::deferred(Ty::deferred(Ty::number()));
        assert_eq!(ty.clone().awaited(), Ty::deferred(Ty::number()));
        assert!(ty.clone().awaited().is_deferred());
        assert!(!ty.awaited().awaited().is_deferred());
        assert_eq!(Ty::string().awaited(), Ty::string());
    }

    #[test]
    fn common_descriptor() {
        assert_eq!(Ty::common(&Ty::number(), &Ty::number()), Ty::number());
        assert_eq!(Ty::common(&Ty::number(), &Ty::string()), Ty::Unknown);
        assert_eq!(Ty::common_all([].iter()), Ty::Unknown);
        let same = [Ty::string(), Ty::string()];
        assert_eq!(Ty::common_all(same.iter()), Ty::string());
    }
}
