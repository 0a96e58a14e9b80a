//! The closed option set carried by the Options group.

use crate::error::{QuantError, QuantResult};
use crate::fields::Expression;

/// Badge tags an entity may display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum OptionTag {
    Mod = 1,
    Dev = 2,
    Sup1 = 3,
    Sup2 = 4,
    Sup3 = 5,
    Inv = 6,
    Hid = 7,
}

impl OptionTag {
    pub const fn parse(value: u8) -> QuantResult<Self> {
        match value {
            1 => Ok(Self::Mod),
            2 => Ok(Self::Dev),
            3 => Ok(Self::Sup1),
            4 => Ok(Self::Sup2),
            5 => Ok(Self::Sup3),
            6 => Ok(Self::Inv),
            7 => Ok(Self::Hid),
            _ => Err(QuantError::UnknownOptionTag { value }),
        }
    }
}

/// Option keys, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum OptionKey {
    Tag = 1,
    Toy = 2,
    Expr = 3,
    Hold = 4,
    Extra = 5,
}

impl OptionKey {
    pub const ALL: [Self; 5] = [Self::Tag, Self::Toy, Self::Expr, Self::Hold, Self::Extra];

    pub const fn parse(key: u8) -> QuantResult<Self> {
        match key {
            1 => Ok(Self::Tag),
            2 => Ok(Self::Toy),
            3 => Ok(Self::Expr),
            4 => Ok(Self::Hold),
            5 => Ok(Self::Extra),
            _ => Err(QuantError::UnknownOptionKey { key }),
        }
    }
}

/// A single option entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityOption {
    Tag(OptionTag),
    Toy(u16),
    Expr(Expression),
    Hold(u16),
    Extra(bool),
}

impl EntityOption {
    #[must_use]
    pub const fn key(&self) -> OptionKey {
        match self {
            Self::Tag(_) => OptionKey::Tag,
            Self::Toy(_) => OptionKey::Toy,
            Self::Expr(_) => OptionKey::Expr,
            Self::Hold(_) => OptionKey::Hold,
            Self::Extra(_) => OptionKey::Extra,
        }
    }
}

/// Options of an entity: at most one value per key.
///
/// An empty set is a valid value and is distinct from the Options group
/// being absent from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityOptions {
    pub tag: Option<OptionTag>,
    pub toy: Option<u16>,
    pub expr: Option<Expression>,
    pub hold: Option<u16>,
    pub extra: Option<bool>,
}

impl EntityOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tag: None,
            toy: None,
            expr: None,
            hold: None,
            extra: None,
        }
    }

    /// Sets an option, replacing any previous value for its key.
    #[must_use]
    pub fn with(mut self, option: EntityOption) -> Self {
        self.set(option);
        self
    }

    pub fn set(&mut self, option: EntityOption) {
        match option {
            EntityOption::Tag(tag) => self.tag = Some(tag),
            EntityOption::Toy(toy) => self.toy = Some(toy),
            EntityOption::Expr(expr) => self.expr = Some(expr),
            EntityOption::Hold(hold) => self.hold = Some(hold),
            EntityOption::Extra(extra) => self.extra = Some(extra),
        }
    }

    /// Returns the entry stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: OptionKey) -> Option<EntityOption> {
        match key {
            OptionKey::Tag => self.tag.map(EntityOption::Tag),
            OptionKey::Toy => self.toy.map(EntityOption::Toy),
            OptionKey::Expr => self.expr.map(EntityOption::Expr),
            OptionKey::Hold => self.hold.map(EntityOption::Hold),
            OptionKey::Extra => self.extra.map(EntityOption::Extra),
        }
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = EntityOption> + '_ {
        OptionKey::ALL.into_iter().filter_map(|key| self.get(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<EntityOption> for EntityOptions {
    fn from_iter<I: IntoIterator<Item = EntityOption>>(iter: I) -> Self {
        let mut options = Self::new();
        for option in iter {
            options.set(option);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_is_key_ordered() {
        let options: EntityOptions = [
            EntityOption::Extra(true),
            EntityOption::Tag(OptionTag::Sup2),
            EntityOption::Hold(40),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = options.iter().map(|o| o.key()).collect();
        assert_eq!(keys, vec![OptionKey::Tag, OptionKey::Hold, OptionKey::Extra]);
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn later_value_replaces_earlier() {
        let options = EntityOptions::new()
            .with(EntityOption::Toy(3))
            .with(EntityOption::Toy(9));
        assert_eq!(options.toy, Some(9));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn empty_options() {
        assert!(EntityOptions::default().is_empty());
        assert_eq!(EntityOptions::new().iter().next(), None);
    }

    #[test]
    fn parse_closed_sets() {
        assert_eq!(OptionKey::parse(3).unwrap(), OptionKey::Expr);
        assert!(matches!(
            OptionKey::parse(0),
            Err(QuantError::UnknownOptionKey { key: 0 })
        ));
        assert_eq!(OptionTag::parse(7).unwrap(), OptionTag::Hid);
        assert!(matches!(
            OptionTag::parse(8),
            Err(QuantError::UnknownOptionTag { value: 8 })
        ));
    }

    #[test]
    fn key_values_ascend() {
        for pair in OptionKey::ALL.windows(2) {
            assert!((pair[0] as u8) < (pair[1] as u8));
        }
    }
}
