//! End-to-end composition: request parameters in, SQL and arguments out.

use gridsql::prelude::*;
use gridsql::{Clause, decode_limit_offset};

fn params(pairs: &[(&str, &str)]) -> QueryParams {
    pairs.iter().copied().collect()
}

fn compose_request<D: Dialect>(
    base: &str,
    registry: &FieldRegistry,
    config: &QueryConfig<D>,
    kind: QueryKind,
    pairs: &[(&str, &str)],
) -> gridsql::Result<QueryResult> {
    let criteria = decode_criteria(&params(pairs), &ParamConfig::default(), config.take_ceiling())?;
    Ok(compose(base, &[], &criteria, registry, config, kind)?)
}

fn user_registry() -> FieldRegistry {
    FieldRegistry::new().field(
        "user.name",
        FieldConfig::new("user.name").filterable().sortable(),
    )
}

// =============================================================================
// Allowlist and capabilities
// =============================================================================

#[test]
fn equality_filter_on_registered_field() {
    let q = compose_request(
        "select * from user",
        &user_registry(),
        &QueryConfig::mysql(),
        QueryKind::Select,
        &[("filters", r#"[{"field":"user.name","operator":"eq","value":"foo"}]"#)],
    )
    .unwrap();
    assert_eq!(q.sql, "select * from user where user.name = ?");
    assert_eq!(q.params, vec![Value::from("foo")]);
}

#[test]
fn unknown_field_is_rejected_in_every_clause() {
    let cases = [
        ("filters", r#"[{"field":"user.id","operator":"eq","value":1}]"#, Clause::Filter),
        ("sorts", r#"[{"field":"user.id","dir":"asc"}]"#, Clause::Sort),
        ("groups", r#"[{"field":"user.id"}]"#, Clause::Group),
    ];
    for (param, json, clause) in cases {
        let err = compose_request(
            "select * from user",
            &user_registry(),
            &QueryConfig::postgres(),
            QueryKind::Select,
            &[(param, json)],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Field);
        assert_eq!(err.field(), Some("user.id"));
        assert_eq!(err.status_code(), 406);
        match err {
            Error::Criteria(e) => assert_eq!(e.clause, clause),
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn filter_capability_is_enforced_regardless_of_other_flags() {
    let registry = FieldRegistry::new().field(
        "email",
        FieldConfig::new("u.email").sortable().groupable(),
    );
    let err = compose_request(
        "select * from u",
        &registry,
        &QueryConfig::postgres(),
        QueryKind::Select,
        &[("filters", r#"[{"field":"email","operator":"eq","value":"a@b"}]"#)],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Operation);
    assert!(err.client_message().contains("email"));
}

// =============================================================================
// Keyword insertion
// =============================================================================

#[test]
fn where_is_inserted_once() {
    let registry = FieldRegistry::new()
        .field("a", FieldConfig::all("a"))
        .field("b", FieldConfig::all("b"))
        .field("c", FieldConfig::all("c"));
    let filters = r#"[{"field":"a","operator":"eq","value":1},
                      {"field":"b","operator":"gt","value":2},
                      {"field":"c","operator":"neq","value":3}]"#;

    let q = compose_request(
        "select * from t",
        &registry,
        &QueryConfig::postgres(),
        QueryKind::Select,
        &[("filters", filters)],
    )
    .unwrap();
    assert_eq!(q.sql.matches("where").count(), 1);
    assert_eq!(q.sql.matches(" and ").count(), 2);

    let config = QueryConfig::postgres().prepend_filter(Filter::new("tenant", Operator::Eq, 1));
    let q = compose_request("select * from t", &registry, &config, QueryKind::Select, &[("filters", filters)])
        .unwrap();
    assert_eq!(q.sql.matches("where").count(), 1);
    assert_eq!(q.sql.matches(" and ").count(), 3);
    assert!(q.sql.starts_with("select * from t where tenant = $1 and a = $2"));
}

#[test]
fn base_query_where_is_respected() {
    let registry = FieldRegistry::new().field("a", FieldConfig::all("a"));
    let q = compose_request(
        "SELECT * FROM t WHERE (x = 1 OR y = 2)",
        &registry,
        &QueryConfig::postgres(),
        QueryKind::Select,
        &[("filters", r#"[{"field":"a","operator":"eq","value":1}]"#)],
    )
    .unwrap();
    assert_eq!(q.sql, "SELECT * FROM t WHERE (x = 1 OR y = 2) and a = $1");
}

#[test]
fn subquery_where_does_not_count() {
    let registry = FieldRegistry::new().field("a", FieldConfig::all("s.a"));
    let q = compose_request(
        "select * from (select a from t where b = 1) s",
        &registry,
        &QueryConfig::postgres(),
        QueryKind::Select,
        &[("filters", r#"[{"field":"a","operator":"eq","value":1}]"#)],
    )
    .unwrap();
    assert_eq!(q.sql, "select * from (select a from t where b = 1) s where s.a = $1");
}

// =============================================================================
// IN expansion and null checks
// =============================================================================

#[test]
fn in_expansion_one_placeholder_per_element() {
    let registry = FieldRegistry::new().field("id", FieldConfig::all("id"));
    for k in 1..=5usize {
        let values: Vec<String> = (0..k).map(|i| i.to_string()).collect();
        let json = format!(r#"[{{"field":"id","operator":"eq","value":[{}]}}]"#, values.join(","));
        let q = compose_request(
            "select * from t",
            &registry,
            &QueryConfig::sql_server(),
            QueryKind::Select,
            &[("filters", json.as_str())],
        )
        .unwrap();
        let expected: Vec<String> = (1..=k).map(|i| format!("@p{i}")).collect();
        assert_eq!(q.sql, format!("select * from t where id in ({})", expected.join(", ")));
        assert_eq!(q.params.len(), k);
        assert!(q.params.iter().all(|v| matches!(v, Value::Int(_))));
    }
}

#[test]
fn isnull_with_value_binds_nothing() {
    let registry = FieldRegistry::new().field("deleted", FieldConfig::all("deleted_at"));
    let q = compose_request(
        "select * from t",
        &registry,
        &QueryConfig::sqlite(),
        QueryKind::Select,
        &[("filters", r#"[{"field":"deleted","operator":"isnull","value":"2024-01-01"}]"#)],
    )
    .unwrap();
    assert_eq!(q.sql, "select * from t where deleted_at is null");
    assert!(q.params.is_empty());
}

#[test]
fn value_faults_name_the_field() {
    let registry = FieldRegistry::new().field("tags", FieldConfig::all("tags"));
    let cases = [
        (r#"[{"field":"tags","operator":"eq"}]"#, ErrorKind::Value),
        (r#"[{"field":"tags","operator":"eq","value":{"a":1}}]"#, ErrorKind::Value),
        (r#"[{"field":"tags","operator":"eq","value":[]}]"#, ErrorKind::Value),
        (r#"[{"field":"tags","operator":"eq","value":[1,{"a":1}]}]"#, ErrorKind::SliceElement),
        (r#"[{"field":"tags","operator":"matches","value":1}]"#, ErrorKind::Operator),
    ];
    for (json, kind) in cases {
        let err = compose_request(
            "select * from t",
            &registry,
            &QueryConfig::sqlite(),
            QueryKind::Select,
            &[("filters", json)],
        )
        .unwrap_err();
        assert_eq!(err.kind(), kind, "{json}");
        assert_eq!(err.field(), Some("tags"));
    }
}

#[test]
fn value_list_limits() {
    let registry = FieldRegistry::new().field("id", FieldConfig::all("id"));
    let list = |n: usize| {
        let items = vec!["1"; n].join(",");
        format!(r#"[{{"field":"id","operator":"in","value":[{items}]}}]"#)
    };
    let run = |json: &str| {
        compose_request(
            "select * from t",
            &registry,
            &QueryConfig::sqlite(),
            QueryKind::Select,
            &[("filters", json)],
        )
    };

    let q = run(&list(gridsql::constants::MAX_IN_VALUES)).unwrap();
    assert_eq!(q.params.len(), gridsql::constants::MAX_IN_VALUES);

    let err = run(&list(gridsql::constants::MAX_IN_VALUES + 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert_eq!(err.field(), Some("id"));

    let err = run(r#"[{"field":"id","operator":"in","value":[[[1]]]}]"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn bad_direction_is_direction_fault() {
    let err = compose_request(
        "select * from user",
        &user_registry(),
        &QueryConfig::sqlite(),
        QueryKind::Select,
        &[("sorts", r#"[{"field":"user.name","dir":"DESC"}]"#)],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Direction);
    assert!(err.to_string().contains("'DESC'"));
}

#[test]
fn malformed_json_is_decode_fault() {
    let err = compose_request(
        "select * from user",
        &user_registry(),
        &QueryConfig::sqlite(),
        QueryKind::Select,
        &[("sorts", "[{")],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.status_code(), 406);
}

// =============================================================================
// Group reconciliation and count symmetry
// =============================================================================

fn grouping_registry() -> FieldRegistry {
    FieldRegistry::new()
        .field("id", FieldConfig::all("id"))
        .field("name", FieldConfig::all("name"))
}

const ID_NAME_SORTS: (&str, &str) = (
    "sorts",
    r#"[{"field":"id","dir":"asc"},{"field":"name","dir":"asc"}]"#,
);
const ID_GROUP: (&str, &str) = ("groups", r#"[{"field":"id"}]"#);

#[test]
fn sort_fields_are_added_to_group_by() {
    let q = compose_request(
        "select id, name from t",
        &grouping_registry(),
        &QueryConfig::postgres(),
        QueryKind::Select,
        &[ID_NAME_SORTS, ID_GROUP],
    )
    .unwrap();
    assert_eq!(q.sql, "select id, name from t group by id, name order by id asc, name asc");
}

#[test]
fn reconciliation_can_be_disabled() {
    let config = QueryConfig::postgres().disable_group_reconcile(true);
    let q = compose_request(
        "select id, name from t",
        &grouping_registry(),
        &config,
        QueryKind::Select,
        &[ID_NAME_SORTS, ID_GROUP],
    )
    .unwrap();
    assert_eq!(q.sql, "select id, name from t group by id order by id asc, name asc");
}

#[test]
fn count_query_matches_where_and_drops_order_and_limit() {
    let registry = FieldRegistry::new()
        .field("id", FieldConfig::all("id"))
        .field("name", FieldConfig::all("name"));
    let pairs = [
        ("filters", r#"[{"field":"name","operator":"startswith","value":"a"}]"#),
        ("sorts", r#"[{"field":"id","dir":"desc"}]"#),
        ("take", "10"),
        ("skip", "30"),
    ];
    let config = QueryConfig::postgres().take_limit(100);

    let rows = compose_request("select * from t", &registry, &config, QueryKind::Select, &pairs)
        .unwrap();
    let count = compose_request("select count(*) from t", &registry, &config, QueryKind::Count, &pairs)
        .unwrap();

    let where_of = |sql: &str| sql.split(" where ").nth(1).map(|s| s.split(" order by ").next().unwrap_or(s).to_string());
    assert_eq!(where_of(&rows.sql), where_of(&count.sql));
    assert!(rows.sql.contains("order by") && rows.sql.contains("limit"));
    assert!(!count.sql.contains("order by"));
    assert!(!count.sql.contains("limit"));
    assert_eq!(count.params, rows.params[..1].to_vec());
}

// =============================================================================
// take / skip
// =============================================================================

#[test]
fn take_and_skip() {
    let p = params(&[("take", "20"), ("skip", "0")]);
    assert_eq!(decode_limit_offset(&p, "take", "skip", 100).unwrap(), LimitOffset::new(20, 0));

    let p = params(&[("take", "101"), ("skip", "0")]);
    assert_eq!(decode_limit_offset(&p, "take", "skip", 100).unwrap(), LimitOffset::new(100, 0));

    let p = params(&[("take", "twenty")]);
    let err = gridsql::Error::from(decode_limit_offset(&p, "take", "skip", 100).unwrap_err());
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn custom_parameter_names() {
    let env = vec![
        ("GRIDSQL_PARAM_FILTERS".to_string(), "where".to_string()),
        ("GRIDSQL_PARAM_TAKE".to_string(), "limit".to_string()),
    ];
    let names = ParamConfig::from_env(&env);
    let p = params(&[
        ("where", r#"[{"field":"user.name","operator":"neq","value":"x"}]"#),
        ("limit", "5"),
    ]);
    let criteria = decode_criteria(&p, &names, Some(50)).unwrap();
    assert_eq!(criteria.filters.len(), 1);
    assert_eq!(criteria.window, Some(LimitOffset::new(5, 0)));
}
