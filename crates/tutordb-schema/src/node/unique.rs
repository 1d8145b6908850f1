use serde::Serialize;
use std::fmt::{self, Display};

///
/// UniqueModel
///
/// One uniqueness constraint (field order is significant).
/// Compound constraints carry the alias used by selectors, e.g. `courseId_order`.
///

#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct UniqueModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'static str>,
    pub fields: &'static [&'static str],
}

impl UniqueModel {
    #[must_use]
    pub const fn single(fields: &'static [&'static str]) -> Self {
        Self { name: None, fields }
    }

    #[must_use]
    pub const fn compound(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self {
            name: Some(name),
            fields,
        }
    }

    #[must_use]
    pub const fn is_compound(&self) -> bool {
        self.fields.len() > 1
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }

    /// Whether `fields` names exactly this constraint's fields (order-insensitive).
    #[must_use]
    pub fn matches_exactly<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        let mut count = 0;
        for field in fields {
            if !self.contains(field) {
                return false;
            }
            count += 1;
        }

        count == self.fields.len()
    }
}

impl Display for UniqueModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.join(", ");

        match self.name {
            Some(name) => write!(f, "UNIQUE {name}({fields})"),
            None => write!(f, "UNIQUE({fields})"),
        }
    }
}
