use crate::model::{EntityModel, MappingContext, PropertyModel};
use thiserror::Error as ThisError;

///
/// PropertyReferenceError
///
/// Failure to resolve a property expression against an entity.
/// Recovered by the mapper (literal fallback); surfaced only where no
/// fallback is acceptable.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PropertyReferenceError {
    #[error("property expression must not be empty")]
    Empty,

    #[error("no property '{property}' found for type '{type_name}'")]
    NoSuchProperty { property: String, type_name: String },

    #[error("property '{property}' of type '{type_name}' cannot be traversed")]
    NotTraversable { property: String, type_name: String },
}

///
/// PathSegment
/// One resolved hop: the owning entity and the property it declares.
///

#[derive(Clone, Copy, Debug)]
pub struct PathSegment<'a> {
    pub owner: &'a EntityModel,
    pub property: &'a PropertyModel,
}

///
/// PropertyPath
///
/// Chain of resolved properties from a root entity to a leaf property.
/// Non-leaf hops always pass through embedded types.
///

#[derive(Clone, Debug)]
pub struct PropertyPath<'a> {
    segments: Vec<PathSegment<'a>>,
}

impl<'a> PropertyPath<'a> {
    /// Resolve a dotted (or camel-case concatenated) property expression.
    ///
    /// Purely numeric segments (collection indexes such as `.0`) are ignored.
    pub fn resolve(
        expression: &str,
        entity: &'a EntityModel,
        ctx: &'a MappingContext,
    ) -> Result<Self, PropertyReferenceError> {
        let parts: Vec<&str> = expression
            .split('.')
            .filter(|part| !part.is_empty() && !is_index(part))
            .collect();

        if parts.is_empty() {
            return Err(PropertyReferenceError::Empty);
        }

        let mut segments = Vec::with_capacity(parts.len());
        let mut owner = entity;

        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                owner = traverse(segments.last(), ctx)?;
            }
            resolve_segment(part, owner, ctx, &mut segments)?;
        }

        Ok(Self { segments })
    }

    /// Single-hop path to a property declared by `owner`.
    #[must_use]
    pub(crate) fn of(owner: &'a EntityModel, property: &'a PropertyModel) -> Self {
        Self {
            segments: vec![PathSegment { owner, property }],
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment<'a>] {
        &self.segments
    }

    /// Leaf property of the path.
    #[must_use]
    pub fn leaf(&self) -> &'a PropertyModel {
        // never empty: resolve rejects empty expressions
        self.segments[self.segments.len() - 1].property
    }

    /// Entity declaring the leaf property.
    #[must_use]
    pub fn leaf_owner(&self) -> &'a EntityModel {
        self.segments[self.segments.len() - 1].owner
    }

    /// Canonical dot path of declared property names.
    #[must_use]
    pub fn to_dot_path(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.property.name())
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn is_index(part: &str) -> bool {
    part.bytes().all(|b| b.is_ascii_digit())
}

fn traverse<'a>(
    previous: Option<&PathSegment<'a>>,
    ctx: &'a MappingContext,
) -> Result<&'a EntityModel, PropertyReferenceError> {
    let Some(previous) = previous else {
        return Err(PropertyReferenceError::Empty);
    };

    ctx.embedded_entity(previous.property)
        .ok_or_else(|| PropertyReferenceError::NotTraversable {
            property: previous.property.name().to_string(),
            type_name: previous.owner.type_name().to_string(),
        })
}

// Resolve one dot segment, splitting camel-case concatenations into nested
// hops. The longest embedded prefix wins.
fn resolve_segment<'a>(
    segment: &str,
    owner: &'a EntityModel,
    ctx: &'a MappingContext,
    out: &mut Vec<PathSegment<'a>>,
) -> Result<(), PropertyReferenceError> {
    if let Some(property) = lookup(owner, segment) {
        out.push(PathSegment { owner, property });
        return Ok(());
    }

    let splits: Vec<usize> = segment
        .char_indices()
        .skip(1)
        .filter(|(_, c)| c.is_ascii_uppercase())
        .map(|(i, _)| i)
        .collect();

    for &split in splits.iter().rev() {
        let (head, tail) = segment.split_at(split);

        let Some(property) = lookup(owner, head) else {
            continue;
        };
        let Some(nested) = ctx.embedded_entity(property) else {
            continue;
        };

        let mark = out.len();
        out.push(PathSegment { owner, property });
        if resolve_segment(tail, nested, ctx, out).is_ok() {
            return Ok(());
        }
        out.truncate(mark);
    }

    Err(PropertyReferenceError::NoSuchProperty {
        property: segment.to_string(),
        type_name: owner.type_name().to_string(),
    })
}

fn lookup<'a>(owner: &'a EntityModel, name: &str) -> Option<&'a PropertyModel> {
    owner
        .property(name)
        .or_else(|| owner.property(&uncapitalize(name)))
}

/// Lower-case the first character (`Lastname` becomes `lastname`).
#[must_use]
pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
