use leila_core::db::open_db_in_memory;
use leila_core::{
    shared, Category, DomainObject, EntityType, Mapper, MapperError, Reader, ReaderMapper,
    WriteOp,
};
use std::rc::Rc;

#[test]
fn insert_populates_generated_id_and_find_by_id_reads_it_back() {
    let conn = open_db_in_memory().unwrap();
    let mapper = ReaderMapper::new(&conn);

    let alice = shared(Reader::new("Alice"));
    let id = mapper.insert_reader(&alice).unwrap();

    assert_eq!(alice.borrow().id, Some(id));
    let loaded = mapper.find_reader(id).unwrap();
    assert_eq!(loaded.borrow().id, Some(id));
    assert_eq!(loaded.borrow().name, "Alice");
    assert!(!Rc::ptr_eq(&loaded, &alice));
}

#[test]
fn all_returns_rows_in_id_order_as_fresh_objects() {
    let conn = open_db_in_memory().unwrap();
    let mapper = ReaderMapper::new(&conn);

    for name in ["Alice", "Bob", "Carol"] {
        mapper.insert_reader(&shared(Reader::new(name))).unwrap();
    }

    let all = mapper.all().unwrap();
    let names: Vec<String> = all
        .iter()
        .map(|object| object.as_reader().unwrap().borrow().name.clone())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    assert!(all.iter().all(|object| object.persisted_id().is_some()));
}

#[test]
fn find_by_id_miss_returns_record_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mapper = ReaderMapper::new(&conn);

    let err = mapper.find_by_id(42).unwrap_err();
    assert!(matches!(err, MapperError::RecordNotFound(42)));
}

#[test]
fn update_overwrites_row_by_id() {
    let conn = open_db_in_memory().unwrap();
    let mapper = ReaderMapper::new(&conn);

    let reader = shared(Reader::new("Alice"));
    let id = mapper.insert_reader(&reader).unwrap();
    reader.borrow_mut().name = "Alicia".to_string();
    mapper.update_reader(&reader).unwrap();

    assert_eq!(mapper.find_reader(id).unwrap().borrow().name, "Alicia");
}

#[test]
fn delete_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let mapper = ReaderMapper::new(&conn);

    let reader = shared(Reader::new("Alice"));
    let id = mapper.insert_reader(&reader).unwrap();
    mapper.delete(&DomainObject::from(&reader)).unwrap();

    assert!(matches!(
        mapper.find_reader(id).unwrap_err(),
        MapperError::RecordNotFound(missing) if missing == id
    ));
    assert!(matches!(
        mapper.delete_reader(&reader).unwrap_err(),
        MapperError::RecordNotFound(_)
    ));
}

#[test]
fn update_and_delete_require_persisted_id() {
    let conn = open_db_in_memory().unwrap();
    let mapper = ReaderMapper::new(&conn);
    let fresh = shared(Reader::new("Nobody"));

    assert!(matches!(
        mapper.update_reader(&fresh).unwrap_err(),
        MapperError::NotPersisted {
            operation: WriteOp::Update
        }
    ));
    assert!(matches!(
        mapper.delete_reader(&fresh).unwrap_err(),
        MapperError::NotPersisted {
            operation: WriteOp::Delete
        }
    ));
}

#[test]
fn insert_rejects_already_persisted_reader() {
    let conn = open_db_in_memory().unwrap();
    let mapper = ReaderMapper::new(&conn);

    let reader = shared(Reader::new("Alice"));
    let id = mapper.insert_reader(&reader).unwrap();

    let err = mapper.insert_reader(&reader).unwrap_err();
    assert!(matches!(err, MapperError::AlreadyPersisted(existing) if existing == id));
    assert_eq!(mapper.all_readers().unwrap().len(), 1);
}

#[test]
fn insert_against_unavailable_table_surfaces_commit_error() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE readers;").unwrap();
    let mapper = ReaderMapper::new(&conn);

    let reader = shared(Reader::new("Alice"));
    let err = mapper.insert_reader(&reader).unwrap_err();

    assert!(matches!(err, MapperError::Commit(_)));
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(reader.borrow().id, None);
}

#[test]
fn mapper_rejects_objects_of_other_types() {
    let conn = open_db_in_memory().unwrap();
    let mapper = ReaderMapper::new(&conn);
    let category = DomainObject::from(&shared(Category::new("rome", None)));

    let err = mapper.insert(&category).unwrap_err();
    assert!(matches!(
        err,
        MapperError::TypeMismatch {
            expected: EntityType::Reader,
            actual: EntityType::Category
        }
    ));
}
