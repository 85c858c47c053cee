use crate::{
    error::InternalError,
    mapping::{Converter, MappingConverter, QueryMapper},
    model::{DataKind, EntityDef, MappingContext, PropertyModel},
    session::{CqlSession, ResultSet, Row},
    statement::{Statement, StatementFactory},
    template::CqlTemplate,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

///
/// person
///
/// Table entity with scalar, UDT and collection properties.
///
pub fn person() -> EntityDef {
    EntityDef::table("Person")
        .property(PropertyModel::new("id", DataKind::Text).id())
        .property(PropertyModel::new("firstname", DataKind::Text))
        .property(PropertyModel::new("lastname", DataKind::Text))
        .property(PropertyModel::new("nickname", DataKind::Text))
        .property(PropertyModel::new("birthDate", DataKind::Date))
        .property(PropertyModel::new("numberOfChildren", DataKind::Int))
        .property(PropertyModel::new("cool", DataKind::Bool))
        .property(PropertyModel::new("mainAddress", DataKind::udt("Address")))
        .property(PropertyModel::new(
            "alternativeAddresses",
            DataKind::list(DataKind::udt("Address")),
        ))
        .property(PropertyModel::new("dates", DataKind::set(DataKind::Date)))
        .property(PropertyModel::new("gender", DataKind::Enum))
}

pub fn address() -> EntityDef {
    EntityDef::user_type("Address")
        .named("address")
        .property(PropertyModel::new("city", DataKind::Text))
        .property(PropertyModel::new("country", DataKind::Text))
}

///
/// group
///
/// Table entity keyed by the `GroupKey` primary key class.
///
pub fn group() -> EntityDef {
    EntityDef::table("Group")
        .named("group")
        .property(PropertyModel::new("id", DataKind::embedded("GroupKey")).id())
        .property(PropertyModel::new("email", DataKind::Text))
        .property(PropertyModel::new("age", DataKind::Int))
}

pub fn group_key() -> EntityDef {
    EntityDef::key_class("GroupKey")
        .property(PropertyModel::new("groupname", DataKind::Text).partition_key())
        .property(
            PropertyModel::new("hashPrefix", DataKind::Text)
                .column("hash_prefix")
                .partition_key(),
        )
        .property(PropertyModel::new("username", DataKind::Text).clustering_key())
}

// Table entity with key properties declared inline (map-id identity).
pub fn event() -> EntityDef {
    EntityDef::table("Event")
        .property(PropertyModel::new("tenant", DataKind::Text).partition_key())
        .property(PropertyModel::new("occurred", DataKind::Timestamp).clustering_key())
        .property(PropertyModel::new("name", DataKind::Text))
}

pub fn context() -> Arc<MappingContext> {
    Arc::new(build_context().expect("fixture context builds"))
}

pub fn build_context() -> Result<MappingContext, InternalError> {
    MappingContext::builder()
        .register(person())
        .register(address())
        .register(group())
        .register(group_key())
        .register(event())
        .build()
}

pub fn converter() -> Arc<MappingConverter> {
    Arc::new(MappingConverter::new(context()))
}

pub fn mapper() -> QueryMapper {
    QueryMapper::new(converter() as Arc<dyn Converter>)
}

pub fn factory() -> StatementFactory {
    StatementFactory::new(mapper())
}

pub fn template(session: Arc<RecordingSession>) -> CqlTemplate<Arc<RecordingSession>> {
    CqlTemplate::new(session, context())
}

///
/// RecordingSession
///
/// In-memory session that records executed statements and answers with
/// queued row batches (empty when nothing is queued).
///

#[derive(Default)]
pub struct RecordingSession {
    executed: Mutex<Vec<Statement>>,
    responses: Mutex<VecDeque<(Vec<Row>, bool)>>,
}

impl RecordingSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, rows: Vec<Row>) {
        self.responses.lock().expect("responses lock").push_back((rows, true));
    }

    /// Answer the next statement as a conditional write the store rejected.
    pub fn respond_not_applied(&self) {
        self.responses.lock().expect("responses lock").push_back((Vec::new(), false));
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.executed.lock().expect("executed lock").clone()
    }

    pub fn last_cql(&self) -> String {
        self.executed()
            .last()
            .map(Statement::to_cql)
            .expect("a statement was executed")
    }
}

impl CqlSession for RecordingSession {
    fn execute(&self, statement: &Statement) -> Result<ResultSet, InternalError> {
        self.executed
            .lock()
            .expect("executed lock")
            .push(statement.clone());

        let (rows, applied) = self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| (Vec::new(), true));

        Ok(ResultSet::new(rows.into_iter().map(Ok), applied))
    }
}
