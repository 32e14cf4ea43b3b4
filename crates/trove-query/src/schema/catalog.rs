//! Built-in field names and the resolvers behind them

use super::{FieldResolver, RootField};
use crate::pipeline::QueryPipeline;
use crate::resolvers::{
    Classes, Direction, InstanceCount, Instances, Literals, NodeResolver, RelationshipCount,
    Relationships, SearchNodes, TypeFacet,
};
use std::sync::Arc;

/// Every field name [`builtin_field`] knows
pub const BUILTIN_FIELDS: &[&str] = &[
    "outgoing",
    "incoming",
    "outgoingCount",
    "incomingCount",
    "outgoingTypeFacet",
    "incomingTypeFacet",
    "instances",
    "instanceCount",
    "classes",
    "literals",
    "node",
    "search",
];

/// Resolver for a built-in field name, using `pipeline` for paging defaults
pub fn builtin_field(name: &str, pipeline: QueryPipeline) -> Option<Arc<dyn FieldResolver>> {
    let resolver: Arc<dyn FieldResolver> = match name {
        "outgoing" => Arc::new(RootField::new(Relationships::outgoing(), pipeline)),
        "incoming" => Arc::new(RootField::new(Relationships::incoming(), pipeline)),
        "outgoingCount" => Arc::new(RootField::new(
            RelationshipCount::new(Direction::Outgoing),
            pipeline,
        )),
        "incomingCount" => Arc::new(RootField::new(
            RelationshipCount::new(Direction::Incoming),
            pipeline,
        )),
        "outgoingTypeFacet" => {
            Arc::new(RootField::new(TypeFacet::new(Direction::Outgoing), pipeline))
        }
        "incomingTypeFacet" => {
            Arc::new(RootField::new(TypeFacet::new(Direction::Incoming), pipeline))
        }
        "instances" => Arc::new(RootField::new(Instances, pipeline)),
        "instanceCount" => Arc::new(RootField::new(InstanceCount, pipeline)),
        "classes" => Arc::new(RootField::new(Classes, pipeline)),
        "literals" => Arc::new(RootField::new(Literals, pipeline)),
        "node" => Arc::new(RootField::new(NodeResolver, pipeline)),
        "search" => Arc::new(SearchNodes::new(pipeline.limits())),
        _ => return None,
    };
    Some(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_field_resolves() {
        for name in BUILTIN_FIELDS {
            let resolver = builtin_field(name, QueryPipeline::default())
                .unwrap_or_else(|| panic!("{name} is listed but not bound"));
            assert_eq!(resolver.name(), *name);
        }
        assert!(builtin_field("period", QueryPipeline::default()).is_none());
    }
}
