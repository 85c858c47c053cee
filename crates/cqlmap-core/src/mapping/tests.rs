use super::*;
use crate::{
    config::MappingConfig,
    cql::{ColumnName, CqlIdentifier},
    error::ErrorClass,
    model::{DataKind, EntityModel, MappingContext, SimpleUserTypeResolver, UserTypeSchema},
    query::{Columns, Criteria, Filter, Operator, Order, Selector, SelectorParam, Sort},
    session::Row,
    test_fixtures,
    value::{ObjectValue, UdtValue, Value},
};
use std::sync::Arc;
use time::{Date, Month};

fn entity<'a>(ctx: &'a MappingContext, type_name: &str) -> &'a EntityModel {
    ctx.required_persistent_entity(type_name).expect("mapped type")
}

fn date(y: i32, m: Month, d: u8) -> Value {
    Value::Date(Date::from_calendar_date(y, m, d).expect("valid date"))
}

fn rendered(filter: &Filter) -> Vec<(String, Operator, Option<Value>)> {
    filter
        .iter()
        .map(|c| (c.column.to_cql(), c.op(), c.value().cloned()))
        .collect()
}

fn selector_names(selectors: &[Selector]) -> Vec<String> {
    selectors.iter().map(ToString::to_string).collect()
}

fn strict_mapper() -> QueryMapper {
    let ctx = MappingContext::builder()
        .config(MappingConfig::default().strict())
        .register(test_fixtures::person())
        .register(test_fixtures::address())
        .build()
        .expect("strict context");

    QueryMapper::new(Arc::new(MappingConverter::new(Arc::new(ctx))))
}

// ----------------------------------------------------------------------
// Property paths
// ----------------------------------------------------------------------

#[test]
fn path_resolves_declared_and_capitalized_names() {
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let path = PropertyPath::resolve("Lastname", person, &ctx).expect("resolves");
    assert_eq!(path.to_dot_path(), "lastname");

    let path = PropertyPath::resolve("birthDate", person, &ctx).expect("resolves");
    assert_eq!(path.leaf().name(), "birthDate");
    assert_eq!(path.leaf_owner().type_name(), "Person");
}

#[test]
fn path_traverses_composite_keys() {
    let ctx = test_fixtures::context();
    let group = entity(&ctx, "Group");

    let dotted = PropertyPath::resolve("id.hashPrefix", group, &ctx).expect("dotted");
    let camel = PropertyPath::resolve("idHashPrefix", group, &ctx).expect("camel case");

    assert_eq!(dotted.to_dot_path(), "id.hashPrefix");
    assert_eq!(camel.to_dot_path(), "id.hashPrefix");
    assert_eq!(camel.segments().len(), 2);
    assert_eq!(camel.leaf_owner().type_name(), "GroupKey");
}

#[test]
fn path_ignores_numeric_segments() {
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let path = PropertyPath::resolve("alternativeAddresses.0", person, &ctx).expect("resolves");

    assert_eq!(path.to_dot_path(), "alternativeAddresses");
}

#[test]
fn path_resolution_failures() {
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    assert_eq!(
        PropertyPath::resolve("", person, &ctx).expect_err("empty"),
        PropertyReferenceError::Empty
    );
    assert!(matches!(
        PropertyPath::resolve("shoeSize", person, &ctx),
        Err(PropertyReferenceError::NoSuchProperty { .. })
    ));
    assert!(matches!(
        PropertyPath::resolve("lastname.length", person, &ctx),
        Err(PropertyReferenceError::NotTraversable { .. })
    ));
}

#[test]
fn path_resolution_is_deterministic() {
    let ctx = test_fixtures::context();
    let group = entity(&ctx, "Group");

    let first = PropertyPath::resolve("idUsername", group, &ctx).expect("resolves");
    let second = PropertyPath::resolve("idUsername", group, &ctx).expect("resolves");

    assert_eq!(first.to_dot_path(), second.to_dot_path());
}

// ----------------------------------------------------------------------
// Field
// ----------------------------------------------------------------------

#[test]
fn field_maps_resolved_property_to_its_column() {
    let ctx = test_fixtures::context();
    let group = entity(&ctx, "Group");

    let field = Field::new("id.hashPrefix", Some(group), &ctx);

    assert!(field.is_resolved());
    assert_eq!(field.property().map(|p| p.name()), Some("hashPrefix"));
    assert_eq!(field.mapped_key().expect("column").to_cql(), "hash_prefix");
}

#[test]
fn field_falls_back_to_literal_name() {
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let field = Field::new("writetime(lastname)", Some(person), &ctx);

    assert!(!field.is_resolved());
    assert!(field.property().is_none());
    assert_eq!(
        field.mapped_key().expect("literal"),
        ColumnName::from_literal("writetime(lastname)").expect("literal")
    );
}

#[test]
fn field_without_entity_is_unresolved() {
    let ctx = test_fixtures::context();
    let field = Field::new("Anything", None, &ctx);

    assert!(matches!(field, Field::Unresolved { .. }));
    assert_eq!(field.mapped_key().expect("literal").to_cql(), "Anything");
}

#[test]
fn field_with_carries_inherited_property() {
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let field = Field::new("lastname", Some(person), &ctx);
    let rebound = field.with("lastname.unknown");

    assert!(!rebound.is_resolved());
    assert_eq!(rebound.name(), "lastname.unknown");
    assert_eq!(rebound.property().map(|p| p.name()), Some("lastname"));
    assert_eq!(rebound.mapped_key().expect("literal").to_cql(), "lastname.unknown");

    let resolved = field.with("firstname");
    assert_eq!(resolved.mapped_key().expect("column").to_cql(), "firstname");
}

// ----------------------------------------------------------------------
// Converter
// ----------------------------------------------------------------------

#[test]
fn set_of_dates_round_trips() {
    let converter = test_fixtures::converter();
    let hint = TypeHint::Kind(DataKind::set(DataKind::Date));
    let dates = Value::set(vec![
        date(2020, Month::May, 1),
        date(2010, Month::July, 4),
    ]);

    let encoded = converter.convert_to_column_value(&dates, &hint).expect("encode");
    let decoded = converter.read_value(&encoded, &hint).expect("decode");

    assert_eq!(decoded, dates);
}

#[test]
fn enum_is_stored_by_name() {
    let converter = test_fixtures::converter();
    let hint = TypeHint::Kind(DataKind::Enum);

    let encoded = converter
        .convert_to_column_value(&Value::Enum("FEMALE".into()), &hint)
        .expect("encode");
    assert_eq!(encoded, Value::from("FEMALE"));

    let decoded = converter.read_value(&encoded, &hint).expect("decode");
    assert_eq!(decoded, Value::Enum("FEMALE".into()));
}

#[test]
fn object_is_encoded_as_udt_in_schema_order() {
    let converter = test_fixtures::converter();
    let address = ObjectValue::new("Address")
        .with("country", "USA")
        .with("city", "Albuquerque");

    let encoded = converter
        .convert_to_column_value(&address.into_value(), &TypeHint::Kind(DataKind::udt("Address")))
        .expect("encode");

    assert_eq!(
        encoded,
        Value::Udt(
            UdtValue::new("address")
                .with("city", "Albuquerque")
                .with("country", "USA")
        )
    );
}

#[test]
fn list_of_objects_is_encoded_element_wise() {
    let converter = test_fixtures::converter();
    let list = Value::list(vec![
        ObjectValue::new("Address").with("city", "Denver").into_value(),
    ]);

    let encoded = converter
        .convert_to_column_value(&list, &TypeHint::Kind(DataKind::list(DataKind::udt("Address"))))
        .expect("encode");

    assert_eq!(
        encoded.to_cql_literal(),
        "[{city:'Denver',country:NULL}]"
    );
}

#[test]
fn object_field_missing_from_schema_fails() {
    let name = CqlIdentifier::cql_id("address").expect("identifier");
    let resolver = SimpleUserTypeResolver::new().with(
        UserTypeSchema::new(name)
            .field(CqlIdentifier::cql_id("country").expect("identifier"), DataKind::Text),
    );
    let ctx = MappingContext::builder()
        .register(test_fixtures::address())
        .user_type_resolver(Arc::new(resolver))
        .build()
        .expect("context");
    let converter = MappingConverter::new(Arc::new(ctx));

    let err = converter
        .convert_to_column_value(
            &ObjectValue::new("Address").with("city", "Denver").into_value(),
            &TypeHint::Unknown,
        )
        .expect_err("city is not in the schema");

    assert_eq!(err.class, ErrorClass::Conversion);
}

#[test]
fn object_of_table_type_is_not_a_udt() {
    let converter = test_fixtures::converter();

    let err = converter
        .convert_to_column_value(
            &ObjectValue::new("Person").with("id", "p1").into_value(),
            &TypeHint::Unknown,
        )
        .expect_err("tables are not user types");

    assert_eq!(err.class, ErrorClass::Conversion);
}

#[test]
fn integers_widen_to_declared_kind() {
    let converter = test_fixtures::converter();

    assert_eq!(
        converter
            .convert_to_column_value(&Value::Int(7), &TypeHint::Kind(DataKind::BigInt))
            .expect("widen"),
        Value::BigInt(7)
    );

    let err = converter
        .convert_to_column_value(&Value::BigInt(i64::MAX), &TypeHint::Kind(DataKind::Int))
        .expect_err("narrowing overflow");
    assert_eq!(err.class, ErrorClass::Conversion);
}

#[test]
fn read_materializes_entity_from_row() {
    let converter = test_fixtures::converter();
    let ctx = converter.context();
    let person = entity(&ctx, "Person");

    let row = Row::new()
        .with("id", "p1")
        .with("lastname", "White")
        .with("gender", "MALE")
        .with("mainaddress", UdtValue::new("address").with("city", "Albuquerque"))
        .with("dates", Value::set(vec![date(2010, Month::July, 4)]));

    let Value::Object(object) = converter.read(person, &row).expect("read") else {
        panic!("expected an object");
    };

    assert_eq!(object.type_name(), "Person");
    assert_eq!(object.get("lastname"), Some(&Value::from("White")));
    assert_eq!(object.get("gender"), Some(&Value::Enum("MALE".into())));
    assert_eq!(object.get("firstname"), None);

    let address = object
        .get("mainAddress")
        .and_then(Value::as_object)
        .expect("address object");
    assert_eq!(address.type_name(), "Address");
    assert_eq!(address.get("city"), Some(&Value::from("Albuquerque")));
}

#[test]
fn read_nests_composite_key_columns() {
    let converter = test_fixtures::converter();
    let ctx = converter.context();
    let group = entity(&ctx, "Group");

    let row = Row::new()
        .with("groupname", "admins")
        .with("hash_prefix", "ab")
        .with("username", "walter")
        .with("email", "w@example.com");

    let Value::Object(object) = converter.read(group, &row).expect("read") else {
        panic!("expected an object");
    };
    let key = object.get("id").and_then(Value::as_object).expect("key");

    assert_eq!(key.type_name(), "GroupKey");
    assert_eq!(key.get("hashPrefix"), Some(&Value::from("ab")));
}

#[test]
fn write_flattens_composite_key() {
    let converter = test_fixtures::converter();
    let ctx = converter.context();
    let group = entity(&ctx, "Group");

    let object = ObjectValue::new("Group")
        .with(
            "id",
            ObjectValue::new("GroupKey")
                .with("groupname", "admins")
                .with("hashPrefix", "ab")
                .with("username", "walter"),
        )
        .with("age", 42);

    let columns: Vec<String> = converter
        .write(&object.into_value(), group)
        .expect("write")
        .into_iter()
        .map(|(column, value)| format!("{column}={value}"))
        .collect();

    assert_eq!(
        columns,
        vec![
            "groupname='admins'",
            "hash_prefix='ab'",
            "username='walter'",
            "email=NULL",
            "age=42",
        ]
    );
}

// ----------------------------------------------------------------------
// Query mapper
// ----------------------------------------------------------------------

#[test]
fn filter_maps_properties_to_columns() {
    let mapper = test_fixtures::mapper();
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let filter = Filter::empty()
        .and(Criteria::on("birthDate").expect("name").gt(date(2000, Month::January, 1)))
        .and(Criteria::on("numberOfChildren").expect("name").lte(3));

    let mapped = mapper.map_filter(&filter, person).expect("mapped");

    assert_eq!(
        rendered(&mapped),
        vec![
            ("birthdate".to_string(), Operator::Gt, Some(date(2000, Month::January, 1))),
            ("numberofchildren".to_string(), Operator::Lte, Some(Value::Int(3))),
        ]
    );
}

#[test]
fn in_operand_is_converted_element_wise() {
    let mapper = test_fixtures::mapper();
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let filter = Filter::empty().and(
        Criteria::on("gender")
            .expect("name")
            .in_values(vec![Value::Enum("MALE".into()), Value::Enum("FEMALE".into())]),
    );

    let mapped = mapper.map_filter(&filter, person).expect("mapped");

    assert_eq!(
        mapped[0].value(),
        Some(&Value::List(vec![Value::from("MALE"), Value::from("FEMALE")]))
    );
}

#[test]
fn contains_operand_uses_element_kind() {
    let mapper = test_fixtures::mapper();
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let filter = Filter::empty().and(
        Criteria::on("alternativeAddresses")
            .expect("name")
            .contains(ObjectValue::new("Address").with("city", "Denver")),
    );

    let mapped = mapper.map_filter(&filter, person).expect("mapped");

    assert_eq!(mapped[0].column.to_cql(), "alternativeaddresses");
    assert!(matches!(mapped[0].value(), Some(Value::Udt(_))));
}

#[test]
fn composite_key_equality_expands_per_column() {
    let mapper = test_fixtures::mapper();
    let ctx = test_fixtures::context();
    let group = entity(&ctx, "Group");

    let key = ObjectValue::new("GroupKey")
        .with("username", "walter")
        .with("groupname", "admins")
        .with("hashPrefix", "ab");
    let filter = Filter::empty().and(Criteria::on("id").expect("name").is(key));

    let mapped = mapper.map_filter(&filter, group).expect("mapped");
    let columns: Vec<String> = mapped.iter().map(|c| c.column.to_cql()).collect();

    assert_eq!(columns, vec!["groupname", "hash_prefix", "username"]);
    assert!(mapped.iter().all(|c| c.op() == Operator::Eq));
}

#[test]
fn unresolved_names_pass_through() {
    let mapper = test_fixtures::mapper();
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let filter = Filter::empty().and(Criteria::on("shoeSize").expect("name").is(44));
    let mapped = mapper.map_filter(&filter, person).expect("mapped");

    assert_eq!(mapped[0].column.to_cql(), "shoeSize");
    assert_eq!(mapped[0].value(), Some(&Value::Int(44)));
}

#[test]
fn strict_resolution_rejects_unknown_names() {
    let mapper = strict_mapper();
    let ctx = mapper.mapping_context();
    let person = entity(ctx, "Person");

    let filter = Filter::empty().and(Criteria::on("shoeSize").expect("name").is(44));
    let err = mapper.map_filter(&filter, person).expect_err("strict");
    assert_eq!(err.class, ErrorClass::PropertyResolution);

    let err = mapper
        .map_sort(&Sort::by([Order::asc("shoeSize")]), person)
        .expect_err("strict sort");
    assert_eq!(err.class, ErrorClass::PropertyResolution);
}

#[test]
fn empty_selection_expands_composite_key_columns() {
    let mapper = test_fixtures::mapper();
    let ctx = test_fixtures::context();
    let group = entity(&ctx, "Group");

    let selectors = mapper.map_selectors(&Columns::empty(), group).expect("mapped");

    assert_eq!(
        selector_names(&selectors),
        vec!["groupname", "hash_prefix", "username", "email", "age"]
    );
}

#[test]
fn explicit_selectors_are_mapped() {
    let mapper = test_fixtures::mapper();
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let columns = Columns::empty()
        .select(Selector::column("birthDate").expect("name").alias(
            CqlIdentifier::cql_id("born").expect("identifier"),
        ))
        .select(Selector::function(
            "ttl",
            vec![SelectorParam::Selector(Selector::column("numberOfChildren").expect("name"))],
        ));

    let selectors = mapper.map_selectors(&columns, person).expect("mapped");

    assert_eq!(
        selector_names(&selectors),
        vec!["birthdate AS born", "ttl(numberofchildren)"]
    );
}

#[test]
fn column_names_skip_composite_keys_when_empty() {
    let mapper = test_fixtures::mapper();
    let ctx = test_fixtures::context();
    let group = entity(&ctx, "Group");

    let names: Vec<String> = mapper
        .map_column_names(&Columns::empty(), group)
        .expect("mapped")
        .iter()
        .map(ColumnName::to_cql)
        .collect();

    assert_eq!(names, vec!["email", "age"]);
}

#[test]
fn column_names_deduplicate_by_property() {
    let mapper = test_fixtures::mapper();
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let columns = Columns::from_names(["lastname", "Lastname", "firstname"]).expect("names");
    let names: Vec<String> = mapper
        .map_column_names(&columns, person)
        .expect("mapped")
        .iter()
        .map(ColumnName::to_cql)
        .collect();

    assert_eq!(names, vec!["lastname", "firstname"]);
}

#[test]
fn sort_maps_keys_and_passes_unknown_through() {
    let mapper = test_fixtures::mapper();
    let ctx = test_fixtures::context();
    let person = entity(&ctx, "Person");

    let sort = Sort::by([Order::desc("birthDate"), Order::asc("token(id)")]);
    let mapped = mapper.map_sort(&sort, person).expect("mapped");

    let keys: Vec<&str> = mapped.iter().map(|o| o.property.as_str()).collect();
    assert_eq!(keys, vec!["birthdate", "token(id)"]);
}
