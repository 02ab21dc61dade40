//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small recipe site and run the full
//! load, crawl, save cycle end-to-end.

use larder::config::{
    parse_config, Config, CrawlerConfig, ExtractionConfig, OutputConfig, TraversalOrder,
    DEFAULT_USER_AGENT,
};
use larder::crawler::{crawl_and_persist, CrawlEngine};
use larder::state::{PageState, ResultMap};
use larder::storage::{RecordStore, ResultStore};
use std::collections::BTreeSet;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration scoped to `<base>/recipe`
fn create_test_config(base_url: &str, results_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            start_url: format!("{}/recipes-a-z", base_url),
            target_prefix: format!("{}/recipe", base_url),
            robots_url: format!("{}/robots.txt", base_url),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            order: TraversalOrder::DepthFirst,
            max_pages: None,
        },
        extraction: ExtractionConfig {
            tag: "span".to_string(),
            attribute: "data-ingredient-name".to_string(),
            value: "true".to_string(),
        },
        output: OutputConfig {
            results_path: results_path.to_string(),
        },
    }
}

fn ingredient_page(items: &[&str], links: &[&str]) -> String {
    let spans: String = items
        .iter()
        .map(|item| format!(r#"<li><span data-ingredient-name="true">{}</span></li>"#, item))
        .collect();
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">link</a>"#, link))
        .collect();
    format!(
        "<html><body><ul>{}</ul><nav>{}</nav></body></html>",
        spans, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn set_of(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn item_set(results: &ResultMap, url: &str) -> BTreeSet<String> {
    results
        .get(url)
        .unwrap_or_default()
        .iter()
        .cloned()
        .collect()
}

#[tokio::test]
async fn test_full_crawl_records_recipes_through_index() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\nAllow: /\n").await;

    mount_page(
        &server,
        "/recipes-a-z",
        ingredient_page(&[], &["/recipe/bread", "/recipe/cake", "/about"]),
    )
    .await;
    mount_page(
        &server,
        "/recipe/bread",
        ingredient_page(&["Flour", "flour", "  Water  ", "Salt"], &["/recipes-a-z"]),
    )
    .await;
    mount_page(
        &server,
        "/recipe/cake",
        ingredient_page(&["Flour", "Sugar", "Eggs"], &["/recipe/bread#reviews"]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let results_path = dir.path().join("recipes.csv");
    let config = create_test_config(&base, results_path.to_str().unwrap());

    let mut engine = CrawlEngine::new(&config, ResultMap::new()).unwrap();
    engine.run().await.unwrap();

    let bread = format!("{}/recipe/bread", base);
    let cake = format!("{}/recipe/cake", base);
    let results = engine.results();

    assert_eq!(results.len(), 2);
    assert_eq!(
        results.get(&bread),
        Some(&["flour".to_string(), "flour".to_string(), "water".to_string(), "salt".to_string()][..])
    );
    assert_eq!(item_set(results, &cake), set_of(&["eggs", "flour", "sugar"]));

    // The A-Z page matches the prefix as a substring, so it is crawled as an index
    assert_eq!(engine.stats().count(PageState::IndexPage), 1);
    assert_eq!(engine.stats().count(PageState::OutOfScope), 1);
    assert_eq!(engine.stats().count(PageState::Recorded), 2);
}

#[tokio::test]
async fn test_start_page_inside_scope_is_followed() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\nDisallow:\n").await;

    mount_page(
        &server,
        "/recipe/index",
        ingredient_page(&[], &["/recipe/bread", "/recipe/cake", "/about"]),
    )
    .await;
    mount_page(
        &server,
        "/recipe/bread",
        ingredient_page(&["Flour", "flour", "  Water  "], &["/recipe/index"]),
    )
    .await;
    mount_page(
        &server,
        "/recipe/cake",
        ingredient_page(&["Flour", "Sugar"], &["/recipe/bread#reviews"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let results_path = dir.path().join("recipes.csv");
    let mut config = create_test_config(&base, results_path.to_str().unwrap());
    config.crawler.start_url = format!("{}/recipe/index", base);

    let mut engine = CrawlEngine::new(&config, ResultMap::new()).unwrap();
    engine.run().await.unwrap();

    let index = format!("{}/recipe/index", base);
    let bread = format!("{}/recipe/bread", base);
    let cake = format!("{}/recipe/cake", base);
    let about = format!("{}/about", base);

    assert_eq!(engine.stats().count(PageState::IndexPage), 1);
    assert_eq!(engine.stats().count(PageState::Recorded), 2);
    assert!(engine.visited().contains(&index));
    assert!(engine.visited().contains(&about));
    assert_eq!(item_set(engine.results(), &bread), set_of(&["flour", "water"]));
    assert!(engine.results().contains(&cake));

    // Every URL ends up in exactly one of the two collections
    for url in [&index, &bread, &cake, &about] {
        assert!(engine.visited().contains(url) != engine.results().contains(url));
    }
}

#[tokio::test]
async fn test_disallowed_paths_never_fetched() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(
        &server,
        "User-agent: Googlebot\nDisallow: /\n\nUser-agent: *\nDisallow: /recipe/private*\n",
    )
    .await;

    mount_page(
        &server,
        "/recipe/index",
        ingredient_page(&[], &["/recipe/private-stash", "/recipe/public"]),
    )
    .await;
    mount_page(&server, "/recipe/public", ingredient_page(&["Honey"], &[])).await;
    Mock::given(method("GET"))
        .and(path("/recipe/private-stash"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base, dir.path().join("r.csv").to_str().unwrap());
    config.crawler.start_url = format!("{}/recipe/index", base);

    let mut engine = CrawlEngine::new(&config, ResultMap::new()).unwrap();
    engine.run().await.unwrap();

    let private = format!("{}/recipe/private-stash", base);
    assert!(engine.visited().contains(&private));
    assert!(!engine.results().contains(&private));
    assert_eq!(engine.stats().count(PageState::Disallowed), 1);
    assert!(engine.results().contains(&format!("{}/recipe/public", base)));
}

#[tokio::test]
async fn test_missing_robots_allows_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/recipe/index", ingredient_page(&["Rice"], &[])).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base, dir.path().join("r.csv").to_str().unwrap());
    config.crawler.start_url = format!("{}/recipe/index", base);

    let mut engine = CrawlEngine::new(&config, ResultMap::new()).unwrap();
    engine.run().await.unwrap();

    assert!(engine.rules().disallowed().is_empty());
    assert_eq!(engine.results().len(), 1);
}

#[tokio::test]
async fn test_fetch_failures_do_not_stop_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\n").await;

    mount_page(
        &server,
        "/recipe/index",
        ingredient_page(&[], &["/recipe/broken", "/recipe/missing", "/recipe/soup"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/recipe/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/recipe/soup", ingredient_page(&["Leek"], &["/recipe/broken"])).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base, dir.path().join("r.csv").to_str().unwrap());
    config.crawler.start_url = format!("{}/recipe/index", base);

    let mut engine = CrawlEngine::new(&config, ResultMap::new()).unwrap();
    engine.run().await.unwrap();

    assert_eq!(engine.stats().count(PageState::FetchFailed), 2);
    assert!(engine.visited().contains(&format!("{}/recipe/broken", base)));
    assert!(engine.visited().contains(&format!("{}/recipe/missing", base)));
    assert!(engine.results().contains(&format!("{}/recipe/soup", base)));
}

#[tokio::test]
async fn test_second_run_skips_saved_pages() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\n").await;

    mount_page(
        &server,
        "/recipe/index",
        ingredient_page(&[], &["/recipe/bread", "/recipe/new"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/recipe/bread"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/recipe/new", ingredient_page(&["Butter", "Egg"], &[])).await;

    let dir = TempDir::new().unwrap();
    let results_path = dir.path().join("recipes.csv");
    let bread = format!("{}/recipe/bread", base);
    std::fs::write(
        &results_path,
        format!("URL,flour,water\n{},Y,Y\n", bread),
    )
    .unwrap();

    let mut config = create_test_config(&base, results_path.to_str().unwrap());
    config.crawler.start_url = format!("{}/recipe/index", base);
    let store = RecordStore::new(&results_path);

    let mut engine = CrawlEngine::new(&config, store.load()).unwrap();
    engine.run().await.unwrap();
    store.save(engine.results()).unwrap();

    let content = std::fs::read_to_string(&results_path).unwrap();
    assert_eq!(
        content,
        format!(
            "URL,flour,water,butter,egg\n{},Y,Y,,\n{}/recipe/new,,,Y,Y\n",
            bread, base
        )
    );
}

#[tokio::test]
async fn test_shutdown_mid_crawl_saves_recorded_rows() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\n").await;

    mount_page(&server, "/recipe/a", ingredient_page(&["Egg"], &["/recipe/slow"])).await;
    Mock::given(method("GET"))
        .and(path("/recipe/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ingredient_page(&["Milk"], &[]))
                .insert_header("content-type", "text/html")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let results_path = dir.path().join("recipes.csv");
    let mut config = create_test_config(&base, results_path.to_str().unwrap());
    config.crawler.start_url = format!("{}/recipe/a", base);
    let store = RecordStore::new(&results_path);

    // Resolves once the slow page has been requested
    let shutdown = async {
        loop {
            let requests = server.received_requests().await.unwrap_or_default();
            if requests.iter().any(|r| r.url.path() == "/recipe/slow") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };

    let mut engine = CrawlEngine::new(&config, store.load()).unwrap();
    let report = crawl_and_persist(&mut engine, &store, shutdown)
        .await
        .unwrap();

    assert!(report.interrupted);
    assert_eq!(report.saved.map(|summary| summary.rows), Some(1));

    let content = std::fs::read_to_string(&results_path).unwrap();
    assert_eq!(content, format!("URL,egg\n{}/recipe/a,Y\n", base));
}

#[tokio::test]
async fn test_crawl_error_still_saves_prior_rows() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\n").await;

    let dir = TempDir::new().unwrap();
    let results_path = dir.path().join("recipes.csv");
    let prior = format!("URL,flour\n{}/recipe/bread,Y\n", base);
    std::fs::write(&results_path, &prior).unwrap();

    let mut config = create_test_config(&base, results_path.to_str().unwrap());
    config.crawler.start_url = "not a url".to_string();
    let store = RecordStore::new(&results_path);

    let mut engine = CrawlEngine::new(&config, store.load()).unwrap();
    let outcome = crawl_and_persist(&mut engine, &store, std::future::pending::<()>()).await;

    assert!(outcome.is_err());
    assert_eq!(std::fs::read_to_string(&results_path).unwrap(), prior);
}

#[tokio::test]
async fn test_upper_case_scheme_in_config_still_crawls() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\n").await;

    mount_page(&server, "/recipe/index", ingredient_page(&[], &["/recipe/soup"])).await;
    mount_page(&server, "/recipe/soup", ingredient_page(&["Leek", "Stock"], &[])).await;

    let dir = TempDir::new().unwrap();
    let results_path = dir.path().join("recipes.csv");
    let shouted = base.replacen("http://", "HTTP://", 1);

    let config = parse_config(&format!(
        r#"
[crawler]
start-url = "{shouted}/recipe/index"
target-prefix = "{shouted}/recipe"
robots-url = "{base}/robots.txt"

[extraction]
tag = "span"
attribute = "data-ingredient-name"
value = "true"

[output]
results-path = '{}'
"#,
        results_path.display()
    ))
    .unwrap();

    let store = RecordStore::new(&results_path);
    let mut engine = CrawlEngine::new(&config, ResultMap::new()).unwrap();
    let report = crawl_and_persist(&mut engine, &store, std::future::pending::<()>())
        .await
        .unwrap();

    assert!(!report.interrupted);
    assert_eq!(engine.stats().count(PageState::Recorded), 1);
    assert_eq!(
        item_set(engine.results(), &format!("{}/recipe/soup", base)),
        set_of(&["leek", "stock"])
    );
}

#[test]
fn test_save_load_round_trip_preserves_item_sets() {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::new(dir.path().join("recipes.csv"));

    let mut results = ResultMap::new();
    results.insert(
        "https://example.com/recipe/1",
        vec!["sugar".to_string(), "flour".to_string(), "sugar".to_string()],
    );
    results.insert(
        "https://example.com/recipe/2",
        vec!["butter".to_string(), "flour".to_string()],
    );

    store.save(&results).unwrap();
    let loaded = store.load();

    assert_eq!(loaded.len(), results.len());
    for (url, _) in results.iter() {
        let expected: BTreeSet<String> = item_set(&results, url);
        assert_eq!(item_set(&loaded, url), expected);
    }

    // Saving what was loaded reproduces the file byte for byte
    let first = std::fs::read(store.path()).unwrap();
    store.save(&loaded).unwrap();
    assert_eq!(std::fs::read(store.path()).unwrap(), first);
}

#[test]
fn test_schema_is_union_of_prior_and_new() {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::new(dir.path().join("recipes.csv"));
    std::fs::write(
        store.path(),
        "URL,all_purpose_flour,egg\nhttp://a,Y,\nhttp://b,,Y\n",
    )
    .unwrap();

    let mut results = store.load();
    results.insert(
        "http://c",
        vec!["all-purpose flour".to_string(), "milk (2%)".to_string()],
    );
    store.save(&results).unwrap();

    let content = std::fs::read_to_string(store.path()).unwrap();
    let header = content.lines().next().unwrap();
    assert_eq!(header, "URL,all_purpose_flour,egg,milk__2__");
    assert!(content.contains("http://c,Y,,Y\n"));
}

#[test]
fn test_config_file_round_trip() {
    let config = parse_config(
        r#"
[crawler]
start-url = "https://example.com/recipe/index"
target-prefix = "https://example.com/recipe"
robots-url = "https://example.com/robots.txt"
order = "breadth-first"

[extraction]
tag = "span"
attribute = "data-ingredient-name"
value = "true"

[output]
results-path = "recipes.csv"
"#,
    )
    .unwrap();

    assert_eq!(config.crawler.order, TraversalOrder::BreadthFirst);
    assert_eq!(config.crawler.user_agent, DEFAULT_USER_AGENT);
    assert!(CrawlEngine::new(&config, ResultMap::new()).is_ok());
}
