use derive_more::Deref;
use std::fmt;

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        })
    }
}

///
/// Order
/// Sort key: a property path before mapping, a column after.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Order {
    pub property: String,
    pub direction: Direction,
}

impl Order {
    #[must_use]
    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Asc)
    }

    #[must_use]
    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Desc)
    }

    #[must_use]
    pub fn new(property: impl Into<String>, direction: Direction) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }
}

///
/// Sort
/// Ordered list of sort keys; empty means unsorted.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct Sort(Vec<Order>);

impl Sort {
    #[must_use]
    pub const fn unsorted() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn by(orders: impl IntoIterator<Item = Order>) -> Self {
        Self(orders.into_iter().collect())
    }

    #[must_use]
    pub fn and(mut self, order: Order) -> Self {
        self.0.push(order);
        self
    }

    /// Append the keys of `other` after this sort's keys.
    #[must_use]
    pub fn merge(mut self, other: &Self) -> Self {
        self.0.extend(other.0.iter().cloned());
        self
    }
}

impl IntoIterator for Sort {
    type Item = Order;
    type IntoIter = std::vec::IntoIter<Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sort {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
