use serde::Serialize;

///
/// EnumModel
/// Declared variant set for an enum-valued column.
///

#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct EnumModel {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

impl EnumModel {
    #[must_use]
    pub const fn new(name: &'static str, variants: &'static [&'static str]) -> Self {
        Self { name, variants }
    }

    /// Resolve a variant literal to its static spelling.
    #[must_use]
    pub fn variant(&self, literal: &str) -> Option<&'static str> {
        self.variants.iter().copied().find(|v| *v == literal)
    }
}
