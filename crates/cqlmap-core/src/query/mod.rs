//! Logical query model: criteria over property names, column selection,
//! sort and limit. Mapped to columns by the query mapper.

mod columns;
mod criteria;
mod sort;


pub use columns::{Columns, Selector, SelectorParam};
pub use criteria::{Criteria, CriteriaBuilder, Filter, Operator, Predicate};
pub use sort::{Direction, Order, Sort};

///
/// Query
///
/// Filter, selection, sort, limit and allow-filtering flag.
/// Built with consuming setters; read-only once handed to the statement
/// factory.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    filter: Filter,
    columns: Columns,
    sort: Sort,
    limit: Option<u32>,
    allow_filtering: bool,
}

impl Query {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn and(mut self, criteria: Criteria) -> Self {
        self.filter.push(criteria);
        self
    }

    #[must_use]
    pub fn columns(mut self, columns: Columns) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn with_allow_filtering(mut self) -> Self {
        self.allow_filtering = true;
        self
    }

    #[must_use]
    pub const fn filter(&self) -> &Filter {
        &self.filter
    }

    #[must_use]
    pub const fn selection(&self) -> &Columns {
        &self.columns
    }

    #[must_use]
    pub const fn ordering(&self) -> &Sort {
        &self.sort
    }

    #[must_use]
    pub const fn max_results(&self) -> Option<u32> {
        self.limit
    }

    #[must_use]
    pub const fn is_allow_filtering(&self) -> bool {
        self.allow_filtering
    }
}
