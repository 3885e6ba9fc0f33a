use std::collections::{BTreeMap, HashMap};

use safe_http::{Query, QueryParams};
use url::Url;

fn base_url() -> Url {
    Url::parse("https://example.com/items").unwrap()
}

#[test]
fn params_keep_insertion_order() {
    let url = QueryParams::new()
        .with("page", 2)
        .with("sort", "-date")
        .add_to_url(&base_url());
    assert_eq!(url.query(), Some("page=2&sort=-date"));
}

#[test]
fn missing_optional_values_are_omitted() {
    let params = QueryParams::new()
        .with_opt("search", Some("rust"))
        .with_opt("state", None::<&str>);
    assert_eq!(params.len(), 1);
    let url = params.add_to_url(&base_url());
    assert_eq!(url.query(), Some("search=rust"));
}

#[test]
fn repeated_keys() {
    let url = QueryParams::new()
        .with_all("id", [100, 200, 300])
        .add_to_url(&base_url());
    assert_eq!(url.query(), Some("id=100&id=200&id=300"));
}

#[test]
fn values_are_encoded() {
    let url = QueryParams::new()
        .with("q", "a&b c")
        .add_to_url(&base_url());
    assert_eq!(url.query(), Some("q=a%26b+c"));
}

#[test]
fn empty_query_leaves_url_untouched() {
    let params = QueryParams::new();
    assert!(params.is_empty());
    let url = params.add_to_url(&base_url());
    assert_eq!(url.as_str(), "https://example.com/items");
}

#[test]
fn appends_to_existing_query() {
    let url = Url::parse("https://example.com/items?lang=en").unwrap();
    let url = [("page", "1")].add_to_url(&url);
    assert_eq!(url.query(), Some("lang=en&page=1"));
}

#[test]
fn replace_drops_existing_query() {
    let url = Url::parse("https://example.com/items?lang=en").unwrap();
    let url = vec![("page".to_string(), 3)].replace_in_url(&url);
    assert_eq!(url.query(), Some("page=3"));
}

#[test]
fn btree_map_is_sorted_by_key() {
    let mut map = BTreeMap::new();
    map.insert("b", 2);
    map.insert("a", 1);
    let url = map.add_to_url(&base_url());
    assert_eq!(url.query(), Some("a=1&b=2"));
}

#[test]
fn hash_map_includes_every_pair() {
    let mut map = HashMap::new();
    map.insert("x", "1");
    map.insert("y", "2");
    let url = map.add_to_url(&base_url());
    let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(pairs.get("x").map(String::as_str), Some("1"));
    assert_eq!(pairs.get("y").map(String::as_str), Some("2"));
}
