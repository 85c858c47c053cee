use crate::{
    error::InternalError,
    mapping::PropertyPath,
    model::{DataKind, EntityModel, MappingContext},
    query::{Direction, Order, Sort},
};

const SELECT_PREFIXES: &[&str] = &["find", "read", "get", "query", "search", "stream"];
const ORDER_BY: &str = "OrderBy";
const ALL_IGNORE_CASE: &[&str] = &["AllIgnoreCase", "AllIgnoringCase"];
const IGNORE_CASE: &[&str] = &["IgnoreCase", "IgnoringCase"];

///
/// SubjectKind
/// What the derived method does with matching rows.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubjectKind {
    Select,
    Count,
    Exists,
    Delete,
}

///
/// Subject
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subject {
    pub kind: SubjectKind,
    pub distinct: bool,
    pub max_results: Option<u32>,
}

///
/// PartType
/// Predicate keyword of one part, with its argument arity.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PartType {
    Between,
    IsNotNull,
    IsNull,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Before,
    After,
    NotLike,
    Like,
    StartingWith,
    EndingWith,
    NotContaining,
    Containing,
    NotIn,
    In,
    True,
    False,
    NegatingSimpleProperty,
    SimpleProperty,
}

impl PartType {
    const ALL: [Self; 21] = [
        Self::Between,
        Self::IsNotNull,
        Self::IsNull,
        Self::LessThan,
        Self::LessThanEqual,
        Self::GreaterThan,
        Self::GreaterThanEqual,
        Self::Before,
        Self::After,
        Self::NotLike,
        Self::Like,
        Self::StartingWith,
        Self::EndingWith,
        Self::NotContaining,
        Self::Containing,
        Self::NotIn,
        Self::In,
        Self::True,
        Self::False,
        Self::NegatingSimpleProperty,
        Self::SimpleProperty,
    ];

    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Between => &["IsBetween", "Between"],
            Self::IsNotNull => &["IsNotNull", "NotNull"],
            Self::IsNull => &["IsNull", "Null"],
            Self::LessThan => &["IsLessThan", "LessThan"],
            Self::LessThanEqual => &["IsLessThanEqual", "LessThanEqual"],
            Self::GreaterThan => &["IsGreaterThan", "GreaterThan"],
            Self::GreaterThanEqual => &["IsGreaterThanEqual", "GreaterThanEqual"],
            Self::Before => &["IsBefore", "Before"],
            Self::After => &["IsAfter", "After"],
            Self::NotLike => &["IsNotLike", "NotLike"],
            Self::Like => &["IsLike", "Like"],
            Self::StartingWith => &["IsStartingWith", "StartingWith", "StartsWith"],
            Self::EndingWith => &["IsEndingWith", "EndingWith", "EndsWith"],
            Self::NotContaining => &["IsNotContaining", "NotContaining", "NotContains"],
            Self::Containing => &["IsContaining", "Containing", "Contains"],
            Self::NotIn => &["IsNotIn", "NotIn"],
            Self::In => &["IsIn", "In"],
            Self::True => &["IsTrue", "True"],
            Self::False => &["IsFalse", "False"],
            Self::NegatingSimpleProperty => &["IsNot", "Not"],
            Self::SimpleProperty => &["Is", "Equals"],
        }
    }

    /// Number of method arguments the part consumes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::IsNotNull | Self::IsNull | Self::True | Self::False => 0,
            Self::Between => 2,
            _ => 1,
        }
    }
}

///
/// Part
/// One predicate of a derived method: property path, keyword and flags.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Part {
    /// Source text of the part (`LastnameStartsWith`).
    pub source: String,
    /// Resolved dot path of declared property names.
    pub property: String,
    /// Declared kind of the leaf property.
    pub kind: DataKind,
    pub part_type: PartType,
    pub ignore_case: bool,
}

impl Part {
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.part_type.arity()
    }
}

///
/// OrPart
/// One disjunct: parts joined by `And`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrPart {
    pub parts: Vec<Part>,
}

///
/// PartTree
///
/// Parsed form of a query method name such as
/// `findTop3ByLastnameAndFirstnameOrderByBirthDateDesc`.
/// Immutable after construction.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartTree {
    method: String,
    subject: Subject,
    branches: Vec<OrPart>,
    sort: Sort,
    all_ignore_case: bool,
}

impl PartTree {
    /// Parse a method name against an entity. Every part must resolve.
    pub fn parse(
        method: &str,
        entity: &EntityModel,
        ctx: &MappingContext,
    ) -> Result<Self, InternalError> {
        let (subject, predicate) = split_subject(method)?;

        let (predicate, order_clause) = match predicate.find(ORDER_BY) {
            Some(index) => (&predicate[..index], Some(&predicate[index + ORDER_BY.len()..])),
            None => (predicate, None),
        };
        if order_clause.is_some_and(|clause| clause.contains(ORDER_BY)) {
            return Err(InternalError::derivation(method, "OrderBy must appear at most once"));
        }

        let (predicate, all_ignore_case) = strip_suffix_any(predicate, ALL_IGNORE_CASE);

        let mut branches = Vec::new();
        if !predicate.is_empty() {
            for branch in split_keyword(predicate, "Or") {
                let parts = split_keyword(branch, "And")
                    .into_iter()
                    .map(|source| parse_part(method, source, all_ignore_case, entity, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                branches.push(OrPart { parts });
            }
        }

        let sort = match order_clause {
            Some(clause) => parse_order_by(method, clause, entity, ctx)?,
            None => Sort::unsorted(),
        };

        Ok(Self {
            method: method.to_string(),
            subject,
            branches,
            sort,
            all_ignore_case,
        })
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub const fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub fn branches(&self) -> &[OrPart] {
        &self.branches
    }

    /// Every part across all branches, in source order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.branches.iter().flat_map(|branch| branch.parts.iter())
    }

    /// Static sort from the `OrderBy` clause.
    #[must_use]
    pub const fn sort(&self) -> &Sort {
        &self.sort
    }

    #[must_use]
    pub const fn is_count_projection(&self) -> bool {
        matches!(self.subject.kind, SubjectKind::Count)
    }

    #[must_use]
    pub const fn is_exists_projection(&self) -> bool {
        matches!(self.subject.kind, SubjectKind::Exists)
    }

    #[must_use]
    pub const fn is_delete(&self) -> bool {
        matches!(self.subject.kind, SubjectKind::Delete)
    }

    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.subject.distinct
    }

    #[must_use]
    pub const fn is_limiting(&self) -> bool {
        self.subject.max_results.is_some()
    }

    #[must_use]
    pub const fn max_results(&self) -> Option<u32> {
        self.subject.max_results
    }

    #[must_use]
    pub const fn is_all_ignore_case(&self) -> bool {
        self.all_ignore_case
    }

    /// Total arguments consumed by the predicate parts.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parts().map(Part::arity).sum()
    }
}

// ----------------------------------------------------------------------
// Subject
// ----------------------------------------------------------------------

fn split_subject(method: &str) -> Result<(Subject, &str), InternalError> {
    let Some((kind, rest)) = match_prefix(method) else {
        // no recognised prefix: the whole name is the predicate
        return Ok((
            Subject {
                kind: SubjectKind::Select,
                distinct: false,
                max_results: None,
            },
            method,
        ));
    };

    let (subject_text, predicate) = match find_by(rest) {
        Some(index) => (&rest[..index], &rest[index + 2..]),
        None => (rest, ""),
    };

    let subject = Subject {
        kind,
        distinct: subject_text.contains("Distinct"),
        max_results: parse_limit(method, subject_text)?,
    };

    Ok((subject, predicate))
}

fn match_prefix(method: &str) -> Option<(SubjectKind, &str)> {
    let candidates = SELECT_PREFIXES
        .iter()
        .map(|prefix| (SubjectKind::Select, *prefix))
        .chain([
            (SubjectKind::Count, "count"),
            (SubjectKind::Exists, "exists"),
            (SubjectKind::Delete, "delete"),
            (SubjectKind::Delete, "remove"),
        ]);

    for (kind, prefix) in candidates {
        if let Some(rest) = method.strip_prefix(prefix)
            && (rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_uppercase()))
        {
            return Some((kind, rest));
        }
    }

    None
}

// Position of the `By` that ends the subject.
fn find_by(rest: &str) -> Option<usize> {
    rest.match_indices("By")
        .map(|(index, _)| index)
        .find(|&index| {
            let after = &rest[index + 2..];
            after.is_empty() || after.starts_with(|c: char| c.is_ascii_uppercase())
        })
}

fn parse_limit(method: &str, subject: &str) -> Result<Option<u32>, InternalError> {
    for keyword in ["First", "Top"] {
        for (index, _) in subject.match_indices(keyword) {
            let rest = &subject[index + keyword.len()..];
            let (digits, after) = rest.split_at(rest.bytes().take_while(u8::is_ascii_digit).count());

            // `Topic` or `Firstname` is a word, not a limit
            if !(after.is_empty() || after.starts_with(|c: char| c.is_ascii_uppercase())) {
                continue;
            }

            if digits.is_empty() {
                return Ok(Some(1));
            }

            let limit = digits.parse::<u32>().map_err(|_| {
                InternalError::derivation(method, format!("invalid result limit '{digits}'"))
            })?;
            if limit == 0 {
                return Err(InternalError::derivation(method, "result limit must be positive"));
            }

            return Ok(Some(limit));
        }
    }

    Ok(None)
}

// ----------------------------------------------------------------------
// Predicate
// ----------------------------------------------------------------------

// Split on a keyword that is followed by an upper-case letter.
fn split_keyword<'a>(text: &'a str, keyword: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut search = 0;

    while let Some(found) = text[search..].find(keyword) {
        let index = search + found;
        let after = &text[index + keyword.len()..];

        if index > start && after.starts_with(|c: char| c.is_ascii_uppercase()) {
            pieces.push(&text[start..index]);
            start = index + keyword.len();
            search = start;
        } else {
            search = index + keyword.len();
        }
    }

    pieces.push(&text[start..]);
    pieces
}

fn strip_suffix_any<'a>(text: &'a str, suffixes: &[&str]) -> (&'a str, bool) {
    suffixes
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
        .map_or((text, false), |stripped| (stripped, true))
}

fn parse_part(
    method: &str,
    source: &str,
    all_ignore_case: bool,
    entity: &EntityModel,
    ctx: &MappingContext,
) -> Result<Part, InternalError> {
    let (text, ignore_case) = strip_suffix_any(source, IGNORE_CASE);

    // Longest keyword whose remainder resolves to a property wins; a name
    // that only resolves whole is a simple property.
    let mut candidates: Vec<(PartType, &str)> = PartType::ALL
        .iter()
        .flat_map(|part_type| {
            part_type
                .keywords()
                .iter()
                .filter(|keyword| text.len() > keyword.len() && text.ends_with(*keyword))
                .map(move |keyword| (*part_type, *keyword))
        })
        .collect();
    candidates.sort_by_key(|(_, keyword)| std::cmp::Reverse(keyword.len()));

    let resolved = candidates
        .into_iter()
        .find_map(|(part_type, keyword)| {
            let property = &text[..text.len() - keyword.len()];
            PropertyPath::resolve(property, entity, ctx)
                .ok()
                .map(|path| (part_type, path))
        })
        .map_or_else(
            || {
                PropertyPath::resolve(text, entity, ctx)
                    .map(|path| (PartType::SimpleProperty, path))
                    .map_err(|err| InternalError::derivation(method, err.to_string()))
            },
            Ok,
        )?;
    let (part_type, path) = resolved;

    Ok(Part {
        source: source.to_string(),
        property: path.to_dot_path(),
        kind: path.leaf().kind().clone(),
        part_type,
        ignore_case: ignore_case || all_ignore_case,
    })
}

// ----------------------------------------------------------------------
// Order by
// ----------------------------------------------------------------------

fn parse_order_by(
    method: &str,
    clause: &str,
    entity: &EntityModel,
    ctx: &MappingContext,
) -> Result<Sort, InternalError> {
    if clause.is_empty() {
        return Err(InternalError::derivation(method, "OrderBy requires at least one property"));
    }

    let mut orders = Vec::new();
    let mut rest = clause;

    while !rest.is_empty() {
        let (block, direction, remaining) = next_order_block(rest);

        let path = PropertyPath::resolve(block, entity, ctx)
            .map_err(|err| InternalError::derivation(method, err.to_string()))?;
        orders.push(Order::new(path.to_dot_path(), direction));

        rest = remaining;
    }

    Ok(Sort::by(orders))
}

// Next `<Property>(Asc|Desc)?` block; a direction ends a block only when
// followed by the end or an upper-case letter.
fn next_order_block(text: &str) -> (&str, Direction, &str) {
    let mut search = 0;

    while search < text.len() {
        let next = [("Asc", Direction::Asc), ("Desc", Direction::Desc)]
            .into_iter()
            .filter_map(|(keyword, direction)| {
                text[search..]
                    .find(keyword)
                    .map(|found| (search + found, keyword, direction))
            })
            .min_by_key(|(index, _, _)| *index);

        let Some((index, keyword, direction)) = next else {
            break;
        };

        let end = index + keyword.len();
        let after = &text[end..];
        if index > 0 && (after.is_empty() || after.starts_with(|c: char| c.is_ascii_uppercase())) {
            return (&text[..index], direction, after);
        }
        search = end;
    }

    (text, Direction::Asc, "")
}
