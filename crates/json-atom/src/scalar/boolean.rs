use std::cmp::Ordering;

use crate::atom::Atom;

/// Inline boolean. Never allocates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Boolean(bool);

impl Boolean {
    pub const TRUE: Boolean = Boolean(true);
    pub const FALSE: Boolean = Boolean(false);

    pub fn new(value: bool) -> Self {
        Boolean(value)
    }

    pub fn value(self) -> bool {
        self.0
    }

    /// Any atom converts to a boolean through its truthiness.
    pub fn cast(atom: &Atom) -> Boolean {
        Boolean(atom.bool_value())
    }

    pub fn is_boolean(atom: &Atom) -> bool {
        matches!(atom, Atom::Boolean(_))
    }
}

impl From<bool> for Boolean {
    fn from(value: bool) -> Self {
        Boolean(value)
    }
}

impl std::fmt::Display for Boolean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.0 { "true" } else { "false" })
    }
}

pub(crate) fn truthiness(atom: &Atom) -> bool {
    matches!(atom, Atom::Boolean(true))
}

pub(crate) fn compare(lhs: &Atom, rhs: &Atom) -> Ordering {
    super::compare_numeric(lhs, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Utf8Text;

    #[test]
    fn cast_uses_truthiness() {
        assert_eq!(Boolean::cast(&Atom::Integer(7)), Boolean::TRUE);
        assert_eq!(Boolean::cast(&Atom::Null), Boolean::FALSE);
        assert_eq!(Boolean::cast(&Atom::Utf8(Utf8Text::empty())), Boolean::FALSE);
    }

    #[test]
    fn false_sorts_before_true() {
        assert_eq!(
            Atom::from(Boolean::FALSE).compare(&Atom::from(Boolean::TRUE)),
            Ordering::Less
        );
        assert_eq!(Boolean::TRUE.to_string(), "true");
    }
}
