use consolecache::resource::{Address, AddressSpec, Metric, ObjectMeta, Status};
use consolecache::{
    CacheError, IndexConfig, IndexedStore, QueryLimits, QueryRequest, Resource, build_filter, build_orderer,
    calc_lower_upper, create_object_cache, execute, execute_with,
};

fn address(ns: &str, name: &str, kind: &str, msgs: f64, ready: bool) -> Resource {
    let (space, addr) = name.split_once('.').unwrap_or(("", name));
    Resource::Address(Address {
        metadata: ObjectMeta::named(ns, name),
        spec: AddressSpec {
            address: addr.into(),
            address_space: space.into(),
            address_type: kind.into(),
            plan: "small".into(),
            topic: None,
        },
        status: Status { is_ready: ready, phase: "Active".into(), messages: vec![] },
        metrics: vec![Metric { name: "enmasse_messages_stored".into(), kind: "gauge".into(), value: msgs, units: "".into() }],
    })
}

fn seeded() -> IndexedStore<Resource> {
    let cache = create_object_cache(&IndexConfig::default()).unwrap();
    for r in [
        address("ns1", "space.alpha", "queue", 5.0, true),
        address("ns1", "space.beta", "topic", 0.0, true),
        address("ns1", "space.gamma", "queue", 12.0, false),
        address("ns2", "space.alpha", "queue", 1.0, true),
        address("ns2", "space.delta", "anycast", 5.0, true),
    ] {
        cache.add(r).unwrap();
    }
    cache
}

fn addresses(filter: Option<&str>, order_by: Option<&str>, offset: Option<i64>, first: Option<i64>) -> QueryRequest {
    QueryRequest {
        index: "id".into(),
        prefix: "Address/".into(),
        filter: filter.map(str::to_string),
        key_paths: vec!["$.metadata.namespace".into(), "$.metadata.name".into()],
        order_by: order_by.map(str::to_string),
        offset,
        first,
    }
}

fn names(page: &consolecache::Page<Resource>) -> Vec<String> {
    page.items.iter().map(|r| format!("{}/{}", r.metadata().namespace, r.metadata().name)).collect()
}

#[test]
fn test_filter_order_and_page() {
    let cache = seeded();
    let req = addresses(Some("`$.spec.type` = 'queue'"), Some("`$.metrics[0].value` DESC"), Some(1), Some(1));
    let page = execute(&cache, &req, None).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(names(&page), vec!["ns1/space.alpha"]);
}

#[test]
fn test_key_extraction_narrows_scan() {
    let cache = seeded();
    let req = addresses(Some("`$.metadata.namespace` = 'ns2'"), Some("`$.metadata.name`"), None, None);
    let page = execute(&cache, &req, None).unwrap();
    assert_eq!(names(&page), vec!["ns2/space.alpha", "ns2/space.delta"]);
    let exact = addresses(Some("`$.metadata.namespace` = 'ns1' AND `$.metadata.name` = 'space.beta'"), None, None, None);
    assert_eq!(names(&execute(&cache, &exact, None).unwrap()), vec!["ns1/space.beta"]);
}

#[test]
fn test_ordering_is_stable_for_ties() {
    let cache = seeded();
    let req = addresses(None, Some("`$.metrics[0].value`"), None, None);
    let page = execute(&cache, &req, None).unwrap();
    // ns1/space.alpha and ns2/space.delta tie on 5.0 and keep primary-key order
    assert_eq!(
        names(&page),
        vec!["ns1/space.beta", "ns2/space.alpha", "ns1/space.alpha", "ns2/space.delta", "ns1/space.gamma"]
    );
}

#[test]
fn test_multi_key_ordering_with_booleans() {
    let cache = seeded();
    let req = addresses(None, Some("`$.status.isReady` ASC, `$.metadata.name` DESC"), None, Some(2));
    let page = execute(&cache, &req, None).unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(names(&page), vec!["ns1/space.gamma", "ns2/space.delta"]);
}

#[test]
fn test_view_predicate_applies_before_paging() {
    let cache = seeded();
    let only_ns2 = consolecache::store::FnPredicate(|r: &Resource| Ok::<_, CacheError>(r.metadata().namespace == "ns2"));
    let page = execute(&cache, &addresses(None, None, None, None), Some(&only_ns2)).unwrap();
    assert_eq!(page.total, 2);
}

#[test]
fn test_compile_errors_surface() {
    let cache = seeded();
    assert!(matches!(execute(&cache, &addresses(Some("'b' > 'a'"), None, None, None), None), Err(CacheError::IllegalOperator(_))));
    assert!(matches!(execute(&cache, &addresses(None, Some("ASC"), None, None), None), Err(CacheError::OrderBy(_))));
    let req = QueryRequest { index: "nope".into(), ..addresses(None, None, None, None) };
    assert!(matches!(execute(&cache, &req, None), Err(CacheError::NoSuchIndex(_))));
}

#[test]
fn test_limits_flow_through_execute() {
    let cache = seeded();
    let limits = QueryLimits { max_order_keys: 1, ..QueryLimits::default() };
    let req = addresses(None, Some("`$.spec.type`, `$.metadata.name` DESC"), None, None);
    let page = execute_with(&cache, &req, None, &limits).unwrap();
    // second key dropped: ties on type keep primary-key order
    assert_eq!(
        names(&page),
        vec!["ns2/space.delta", "ns1/space.alpha", "ns1/space.gamma", "ns2/space.alpha", "ns1/space.beta"]
    );
}

#[test]
fn test_build_filter_without_text() {
    let built = build_filter(None, &["$.metadata.namespace"]).unwrap();
    assert!(built.expression.is_none());
    assert!(built.key_suffix.is_empty());
}

#[test]
fn test_orderer_on_json_values() {
    let mut rows = vec![serde_json::json!({"a": "b"}), serde_json::json!({"a": "a"}), serde_json::json!({"a": null})];
    build_orderer(Some("`$.a`")).unwrap().sort(&mut rows);
    assert_eq!(rows[0]["a"], serde_json::Value::Null);
    assert_eq!(rows[1]["a"], "a");
}

#[test]
fn test_calc_lower_upper() {
    assert_eq!(calc_lower_upper(None, None, 5), (0, 5));
    assert_eq!(calc_lower_upper(Some(3), Some(10), 5), (3, 5));
    assert_eq!(calc_lower_upper(Some(0), Some(0), 5), (0, 0));
}
