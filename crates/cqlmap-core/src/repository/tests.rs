use super::*;
use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::DataKind,
    query::{Order, Sort},
    session::Row,
    statement::Statement,
    test_fixtures::{self, RecordingSession},
    value::{ObjectValue, UdtValue, Value},
};
use std::sync::Arc;

const PERSON_COLUMNS: &str = "id,firstname,lastname,nickname,birthdate,numberofchildren,cool,\
                              mainaddress,alternativeaddresses,dates,gender";

fn tree(method: &str) -> Result<PartTree, InternalError> {
    let ctx = test_fixtures::context();
    let person = ctx.required_persistent_entity("Person").expect("person");

    PartTree::parse(method, person, &ctx)
}

fn text_params(count: usize) -> Parameters {
    (0..count).fold(Parameters::new(), |params, _| params.value(DataKind::Text))
}

// Build the statement for `method` on Person without executing it.
fn derive(method: QueryMethod, arguments: &[Argument]) -> Result<Statement, InternalError> {
    let ctx = test_fixtures::context();
    let query = RepositoryQuery::new(method, &ctx)?;
    let template = test_fixtures::template(RecordingSession::new());
    let accessor = ParameterAccessor::new(query.method().declared_parameters(), arguments);

    query.create_query(&accessor, &template)
}

fn derive_cql(method: QueryMethod, arguments: &[Argument]) -> String {
    derive(method, arguments).expect("statement").to_cql()
}

// ----------------------------------------------------------------------
// Part tree
// ----------------------------------------------------------------------

#[test]
fn subject_prefixes_select_the_operation() {
    let cases = [
        ("findByLastname", SubjectKind::Select),
        ("readByLastname", SubjectKind::Select),
        ("streamByLastname", SubjectKind::Select),
        ("countByLastname", SubjectKind::Count),
        ("existsByLastname", SubjectKind::Exists),
        ("deleteByLastname", SubjectKind::Delete),
        ("removeByLastname", SubjectKind::Delete),
    ];

    for (method, kind) in cases {
        assert_eq!(tree(method).expect(method).subject().kind, kind, "{method}");
    }
}

#[test]
fn subject_carries_distinct_and_limit() {
    let distinct = tree("findDistinctByLastname").expect("distinct");
    assert!(distinct.is_distinct());
    assert!(!distinct.is_limiting());

    let top = tree("findTop3ByLastname").expect("top");
    assert_eq!(top.max_results(), Some(3));

    let first = tree("findFirstByLastname").expect("first");
    assert_eq!(first.max_results(), Some(1));

    let err = tree("findTop0ByLastname").expect_err("zero limit");
    assert_eq!(err.class, ErrorClass::QueryCreation);
}

#[test]
fn limit_keyword_must_stand_alone_in_the_subject() {
    for method in ["findTopicByLastname", "findFirstlyByLastname"] {
        assert!(!tree(method).expect(method).is_limiting(), "{method}");
    }

    assert_eq!(tree("findTop10UsersByLastname").expect("top").max_results(), Some(10));
    assert_eq!(tree("findPeopleFirstByLastname").expect("first").max_results(), Some(1));

    let method = QueryMethod::new("findTopicByLastname", "Person").parameters(text_params(1));
    assert_eq!(
        derive_cql(method, &[Argument::value("White")]),
        format!("SELECT {PERSON_COLUMNS} FROM person WHERE lastname='White';")
    );
}

#[test]
fn keywords_resolve_to_part_types() {
    let cases = [
        ("findByLastname", PartType::SimpleProperty),
        ("findByLastnameNot", PartType::NegatingSimpleProperty),
        ("findByBirthDateBefore", PartType::Before),
        ("findByNumberOfChildrenGreaterThanEqual", PartType::GreaterThanEqual),
        ("findByNumberOfChildrenBetween", PartType::Between),
        ("findByNicknameIsNotNull", PartType::IsNotNull),
        ("findByLastnameStartsWith", PartType::StartingWith),
        ("findByCoolTrue", PartType::True),
        ("findByLastnameNotIn", PartType::NotIn),
    ];

    for (method, part_type) in cases {
        let tree = tree(method).expect(method);
        let part = tree.parts().next().expect("one part");
        assert_eq!(part.part_type, part_type, "{method}");
    }
}

#[test]
fn parts_split_on_and_and_count_arguments() {
    let tree = tree("findByNumberOfChildrenBetweenAndCoolTrueAndLastname").expect("tree");

    let properties: Vec<&str> = tree.parts().map(|part| part.property.as_str()).collect();
    assert_eq!(properties, vec!["numberOfChildren", "cool", "lastname"]);
    assert_eq!(tree.arity(), 3);
    assert_eq!(tree.branches().len(), 1);
}

#[test]
fn or_splits_branches() {
    let tree = tree("findByLastnameOrFirstname").expect("tree");

    assert_eq!(tree.branches().len(), 2);
}

#[test]
fn order_by_parses_directions() {
    let tree = tree("findByLastnameOrderByBirthDateDescFirstname").expect("tree");

    assert_eq!(
        tree.sort().to_vec(),
        vec![Order::desc("birthDate"), Order::asc("firstname")]
    );
}

#[test]
fn nested_key_path_resolves_through_embedded_type() {
    let ctx = test_fixtures::context();
    let group = ctx.required_persistent_entity("Group").expect("group");

    let tree = PartTree::parse("findByIdHashPrefix", group, &ctx).expect("tree");
    let part = tree.parts().next().expect("part");

    assert_eq!(part.property, "id.hashPrefix");
    assert_eq!(part.kind, DataKind::Text);
}

#[test]
fn unknown_property_fails_parsing() {
    let err = tree("findByShoeSize").expect_err("unknown property");

    assert_eq!(err.class, ErrorClass::QueryCreation);
    assert_eq!(err.origin, ErrorOrigin::Derivation);
    assert_eq!(err.query_method(), Some("findByShoeSize"));
}

#[test]
fn order_by_must_name_a_property() {
    let err = tree("findByLastnameOrderBy").expect_err("empty order by");

    assert_eq!(err.class, ErrorClass::QueryCreation);
}

// ----------------------------------------------------------------------
// Derivation
// ----------------------------------------------------------------------

#[test]
fn conjunction_binds_arguments_in_order() {
    let method = QueryMethod::new("findByFirstnameAndLastname", "Person").parameters(text_params(2));

    assert_eq!(
        derive_cql(method, &[Argument::value("Walter"), Argument::value("White")]),
        format!("SELECT {PERSON_COLUMNS} FROM person WHERE firstname='Walter' AND lastname='White';")
    );
}

#[test]
fn text_keywords_become_like_patterns() {
    let starts = QueryMethod::new("findByLastnameStartingWith", "Person").parameters(text_params(1));
    let contains = QueryMethod::new("findByNicknameContaining", "Person").parameters(text_params(1));
    let ends = QueryMethod::new("findByNicknameEndsWith", "Person").parameters(text_params(1));

    assert!(derive_cql(starts, &[Argument::value("Wh")]).ends_with("WHERE lastname LIKE 'Wh%';"));
    assert!(
        derive_cql(contains, &[Argument::value("eisen")]).ends_with("WHERE nickname LIKE '%eisen%';")
    );
    assert!(derive_cql(ends, &[Argument::value("berg")]).ends_with("WHERE nickname LIKE '%berg';"));
}

#[test]
fn between_is_exclusive_on_both_bounds() {
    let method = QueryMethod::new("findByNumberOfChildrenBetween", "Person")
        .parameters(Parameters::new().value(DataKind::Int).value(DataKind::Int));

    assert!(
        derive_cql(method, &[Argument::value(1), Argument::value(3)])
            .ends_with("WHERE numberofchildren>1 AND numberofchildren<3;")
    );
}

#[test]
fn boolean_and_null_keywords_take_no_arguments() {
    let method = QueryMethod::new("findByCoolFalseAndNicknameIsNotNull", "Person");

    assert!(derive_cql(method, &[]).ends_with("WHERE cool=false AND nickname IS NOT NULL;"));
}

#[test]
fn enum_argument_is_stored_as_its_name() {
    let method = QueryMethod::new("findByGender", "Person")
        .parameters(Parameters::new().value(DataKind::Enum));

    assert!(
        derive_cql(method, &[Argument::value(Value::Enum("FEMALE".into()))])
            .ends_with("WHERE gender='FEMALE';")
    );
}

#[test]
fn structured_arguments_bind_as_udt_values() {
    let address = ObjectValue::new("Address").with("city", "Denver");

    let eq = QueryMethod::new("findByMainAddress", "Person")
        .parameters(Parameters::new().value(DataKind::udt("Address")));
    assert!(
        derive_cql(eq, &[Argument::value(address.clone())])
            .ends_with("WHERE mainaddress={city:'Denver',country:NULL};")
    );

    // element type comes from the property when the parameter is untyped
    let contains = QueryMethod::new("findByAlternativeAddressesContaining", "Person")
        .parameters(Parameters::new().value(DataKind::Unknown));
    assert!(
        derive_cql(contains, &[Argument::value(address)])
            .ends_with("WHERE alternativeaddresses CONTAINS {city:'Denver',country:NULL};")
    );
}

#[test]
fn composite_key_argument_expands_to_key_columns() {
    let key = ObjectValue::new("GroupKey")
        .with("groupname", "admins")
        .with("hashPrefix", "ab")
        .with("username", "walter");
    let method = QueryMethod::new("findById", "Group")
        .parameters(Parameters::new().value(DataKind::embedded("GroupKey")));

    assert_eq!(
        derive_cql(method, &[Argument::value(key)]),
        "SELECT groupname,hash_prefix,username,email,age FROM group \
         WHERE groupname='admins' AND hash_prefix='ab' AND username='walter';"
    );
}

#[test]
fn nested_key_property_maps_to_its_column() {
    let method = QueryMethod::new("findByIdHashPrefix", "Group").parameters(text_params(1));

    assert!(derive_cql(method, &[Argument::value("ab")]).ends_with("WHERE hash_prefix='ab';"));
}

#[test]
fn limit_static_and_dynamic_sort_are_applied() {
    let method = QueryMethod::new("findTop3ByLastnameOrderByFirstnameAsc", "Person")
        .parameters(Parameters::new().value(DataKind::Text).sort());
    let arguments = [
        Argument::value("White"),
        Argument::from(Sort::by([Order::desc("birthDate")])),
    ];

    assert!(
        derive_cql(method, &arguments)
            .ends_with("WHERE lastname='White' ORDER BY firstname ASC,birthdate DESC LIMIT 3;")
    );
}

#[test]
fn allow_filtering_is_carried_from_the_method() {
    let method = QueryMethod::new("findByNickname", "Person")
        .parameters(text_params(1))
        .allow_filtering();

    assert!(
        derive_cql(method, &[Argument::value("Heisenberg")])
            .ends_with("WHERE nickname='Heisenberg' ALLOW FILTERING;")
    );
}

#[test]
fn subjects_pick_the_statement_form() {
    let count = QueryMethod::new("countByLastname", "Person").parameters(text_params(1));
    let exists = QueryMethod::new("existsByLastname", "Person").parameters(text_params(1));
    let delete = QueryMethod::new("deleteByLastname", "Person").parameters(text_params(1));
    let args = [Argument::value("White")];

    assert_eq!(
        derive_cql(count, &args),
        "SELECT count(*) FROM person WHERE lastname='White';"
    );
    assert_eq!(
        derive_cql(exists, &args),
        format!("SELECT {PERSON_COLUMNS} FROM person WHERE lastname='White' LIMIT 1;")
    );
    assert_eq!(derive_cql(delete, &args), "DELETE FROM person WHERE lastname='White';");
}

#[test]
fn or_is_rejected_at_creation() {
    let method = QueryMethod::new("findByLastnameOrFirstname", "Person").parameters(text_params(2));
    let err = derive(method, &[Argument::value("a"), Argument::value("b")]).expect_err("or");

    assert_eq!(err.class, ErrorClass::QueryCreation);
    assert_eq!(err.query_method(), Some("findByLastnameOrFirstname"));
}

#[test]
fn ignore_case_is_rejected_at_registration() {
    let ctx = test_fixtures::context();

    for name in ["findByLastnameIgnoreCase", "findByLastnameAndFirstnameAllIgnoreCase"] {
        let method = QueryMethod::new(name, "Person").parameters(text_params(2));
        let err = RepositoryQuery::new(method, &ctx).expect_err(name);

        assert_eq!(err.class, ErrorClass::QueryCreation, "{name}");
        assert!(err.message.contains("IgnoreCase"), "{name}");
    }
}

#[test]
fn unsupported_keywords_are_wrapped() {
    let method = QueryMethod::new("findByLastnameNotIn", "Person")
        .parameters(Parameters::new().value(DataKind::list(DataKind::Text)));
    let err = derive(method, &[Argument::value(vec![Value::from("a")])]).expect_err("not in");

    assert_eq!(err.class, ErrorClass::QueryCreation);
    assert_eq!(err.root_class(), ErrorClass::Unsupported);
}

#[test]
fn missing_argument_is_reported() {
    let method = QueryMethod::new("findByFirstnameAndLastname", "Person").parameters(text_params(1));
    let err = derive(method, &[Argument::value("Walter")]).expect_err("too few");

    assert_eq!(err.class, ErrorClass::QueryCreation);
    assert_eq!(err.root_class(), ErrorClass::InvalidArgument);
}

#[test]
fn unmapped_domain_type_fails_registration() {
    let ctx = test_fixtures::context();
    let err = RepositoryQuery::new(QueryMethod::new("findByName", "Car"), &ctx)
        .expect_err("unmapped");

    assert_eq!(err.class, ErrorClass::QueryCreation);
    assert_eq!(err.root_class(), ErrorClass::NotFound);
}

// ----------------------------------------------------------------------
// String-based queries
// ----------------------------------------------------------------------

#[test]
fn placeholders_are_parsed_and_rewritten() {
    let query = StringBasedQuery::new(
        "SELECT * FROM person WHERE lastname=?1 AND firstname=:first AND nickname='a?:b' AND id=?",
    )
    .expect("query");

    assert_eq!(
        query.cql(),
        "SELECT * FROM person WHERE lastname=? AND firstname=? AND nickname='a?:b' AND id=?"
    );
    assert_eq!(
        query.bindings(),
        &[
            Binding::Index(1),
            Binding::Named("first".to_string()),
            Binding::Index(0),
        ]
    );
}

#[test]
fn empty_annotated_query_is_rejected() {
    let err = StringBasedQuery::new("   ").expect_err("empty");

    assert_eq!(err.class, ErrorClass::InvalidArgument);
}

#[test]
fn overflowing_placeholder_index_is_rejected() {
    let err = StringBasedQuery::new("SELECT * FROM person WHERE id=?99999999999999999999999")
        .expect_err("overflowing index");
    assert_eq!(err.class, ErrorClass::InvalidArgument);
    assert!(err.message.contains("?99999999999999999999999"));

    let ctx = test_fixtures::context();
    let method = QueryMethod::new("byId", "Person")
        .parameters(text_params(1))
        .query("SELECT * FROM person WHERE id=?99999999999999999999999");
    let err = RepositoryQuery::new(method, &ctx).expect_err("registration");
    assert_eq!(err.class, ErrorClass::QueryCreation);
    assert_eq!(err.query_method(), Some("byId"));
    assert_eq!(err.root_class(), ErrorClass::InvalidArgument);
}

#[test]
fn named_parameters_bind_by_name() {
    let method = QueryMethod::new("byName", "Person")
        .parameters(
            Parameters::new()
                .named("first", DataKind::Text)
                .named("last", DataKind::Text),
        )
        .query("SELECT * FROM person WHERE lastname=:last AND firstname=:first");

    let statement =
        derive(method, &[Argument::value("Walter"), Argument::value("White")]).expect("statement");

    assert_eq!(
        statement.to_cql(),
        "SELECT * FROM person WHERE lastname=? AND firstname=?"
    );
    assert_eq!(
        statement.bound_values(),
        &[Value::from("White"), Value::from("Walter")]
    );
}

#[test]
fn unknown_named_parameter_fails_at_bind_time() {
    let ctx = test_fixtures::context();
    let method = QueryMethod::new("byNickname", "Person")
        .parameters(Parameters::new().named("nickname", DataKind::Text))
        .query("SELECT * FROM person WHERE nickname=:nick");

    // registration only parses placeholders
    assert!(RepositoryQuery::new(method.clone(), &ctx).is_ok());

    let err = derive(method, &[Argument::value("Heisenberg")]).expect_err("unknown name");
    assert_eq!(err.class, ErrorClass::QueryCreation);
    assert!(err.message.contains("':nick'"));
}

#[test]
fn annotated_udt_parameter_is_encoded() {
    let method = QueryMethod::new("byAddress", "Person")
        .parameters(Parameters::new().value(DataKind::udt("Address")))
        .query("SELECT * FROM person WHERE mainaddress=?0");
    let address = ObjectValue::new("Address")
        .with("city", "Denver")
        .with("country", "US");

    let statement = derive(method, &[Argument::value(address)]).expect("statement");

    assert_eq!(
        statement.bound_values(),
        &[Value::Udt(
            UdtValue::new("address")
                .with("city", "Denver")
                .with("country", "US")
        )]
    );
}

// ----------------------------------------------------------------------
// Execution
// ----------------------------------------------------------------------

fn person_row(id: &str, firstname: &str, lastname: &str) -> Row {
    Row::new()
        .with("id", id)
        .with("firstname", firstname)
        .with("lastname", lastname)
}

fn register(method: QueryMethod) -> RepositoryQuery {
    RepositoryQuery::new(method, &test_fixtures::context()).expect("registered")
}

#[test]
fn count_execution_reads_the_aggregate() {
    let session = RecordingSession::new();
    session.respond(vec![Row::new().with("count", 3_i64)]);
    let template = test_fixtures::template(Arc::clone(&session));

    let query = register(QueryMethod::new("countByLastname", "Person").parameters(text_params(1)));
    let result = query
        .execute(&[Argument::value("White")], &template)
        .expect("count");

    assert_eq!(result.as_count(), Some(3));
    assert_eq!(
        session.last_cql(),
        "SELECT count(*) FROM person WHERE lastname='White';"
    );
}

#[test]
fn exists_execution_checks_for_a_row() {
    let session = RecordingSession::new();
    session.respond(vec![person_row("p1", "Walter", "White")]);
    let template = test_fixtures::template(Arc::clone(&session));

    let query = register(QueryMethod::new("existsByLastname", "Person").parameters(text_params(1)));

    let found = query
        .execute(&[Argument::value("White")], &template)
        .expect("exists");
    assert_eq!(found.as_exists(), Some(true));

    let missing = query
        .execute(&[Argument::value("Pinkman")], &template)
        .expect("exists");
    assert_eq!(missing.as_exists(), Some(false));
}

#[test]
fn single_execution_reads_the_first_entity() {
    let session = RecordingSession::new();
    session.respond(vec![
        person_row("p1", "Walter", "White"),
        person_row("p2", "Skyler", "White"),
    ]);
    let template = test_fixtures::template(Arc::clone(&session));

    let query = register(
        QueryMethod::new("findByLastname", "Person")
            .parameters(text_params(1))
            .returns(ReturnShape::Single),
    );
    let entity = query
        .execute(&[Argument::value("White")], &template)
        .expect("single")
        .into_entity()
        .expect("entity");

    let person = entity.as_object().expect("object");
    assert_eq!(person.type_name(), "Person");
    assert_eq!(person.get("firstname"), Some(&Value::from("Walter")));
}

#[test]
fn collection_execution_reads_every_row() {
    let session = RecordingSession::new();
    session.respond(vec![
        person_row("p1", "Walter", "White"),
        person_row("p2", "Skyler", "White"),
    ]);
    let template = test_fixtures::template(Arc::clone(&session));

    let query = register(QueryMethod::new("findByLastname", "Person").parameters(text_params(1)));
    let entities = query
        .execute(&[Argument::value("White")], &template)
        .expect("collection")
        .into_entities()
        .expect("entities");

    assert_eq!(entities.len(), 2);
}

#[test]
fn stream_execution_is_lazy_and_single_pass() {
    let session = RecordingSession::new();
    session.respond(vec![
        person_row("p1", "Walter", "White"),
        person_row("p2", "Skyler", "White"),
    ]);
    let template = test_fixtures::template(Arc::clone(&session));

    let query = register(
        QueryMethod::new("streamByLastname", "Person")
            .parameters(text_params(1))
            .returns(ReturnShape::Stream),
    );
    let QueryResult::Stream(mut stream) = query
        .execute(&[Argument::value("White")], &template)
        .expect("stream")
    else {
        panic!("expected a stream");
    };

    assert!(stream.next().is_some());
    assert!(stream.next().is_some());
    assert!(stream.next().is_none());
}

#[test]
fn projection_execution_reshapes_entities() {
    let session = RecordingSession::new();
    session.respond(vec![person_row("p1", "Walter", "White")]);
    let template = test_fixtures::template(Arc::clone(&session));

    let query = register(
        QueryMethod::new("findByLastname", "Person")
            .parameters(text_params(1))
            .projecting(ProjectionModel::new("NameOnly", ["firstname", "lastname"])),
    );
    let entities = query
        .execute(&[Argument::value("White")], &template)
        .expect("projection")
        .into_entities()
        .expect("entities");

    assert_eq!(
        entities,
        vec![Value::Object(
            ObjectValue::new("NameOnly")
                .with("firstname", "Walter")
                .with("lastname", "White")
        )]
    );
}

#[test]
fn delete_execution_reports_applied() {
    let session = RecordingSession::new();
    let template = test_fixtures::template(Arc::clone(&session));

    let query = register(QueryMethod::new("deleteByLastname", "Person").parameters(text_params(1)));
    let result = query
        .execute(&[Argument::value("White")], &template)
        .expect("delete");

    assert!(matches!(result, QueryResult::Applied(true)));
    assert_eq!(session.last_cql(), "DELETE FROM person WHERE lastname='White';");
}

#[test]
fn argument_count_mismatch_is_rejected_before_execution() {
    let session = RecordingSession::new();
    let template = test_fixtures::template(Arc::clone(&session));

    let query = register(QueryMethod::new("findByLastname", "Person").parameters(text_params(1)));
    let err = query.execute(&[], &template).expect_err("no arguments");

    assert_eq!(err.class, ErrorClass::QueryCreation);
    assert!(session.executed().is_empty());
}

#[test]
fn parsed_tree_is_shared_across_invocations() {
    let session = RecordingSession::new();
    let template = test_fixtures::template(Arc::clone(&session));

    let query = register(QueryMethod::new("findByLastname", "Person").parameters(text_params(1)));
    let before = query.tree().cloned();

    for name in ["White", "Pinkman"] {
        query.execute(&[Argument::value(name)], &template).expect("run");
    }

    assert_eq!(query.tree().cloned(), before);
    assert_eq!(session.executed().len(), 2);
    assert!(session.last_cql().ends_with("WHERE lastname='Pinkman';"));
}
