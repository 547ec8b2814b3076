mod common;

use common::*;
use feed_syndication::destinations::smartnews::SmartNewsRenderer;
use feed_syndication::resolvers::FieldPlan;
use feed_syndication::{
    DestinationStrategy, ErrorKind, FeedDescriptor, HookPoint, HookRegistry, InMemoryRepository, RequestContext,
    SelectionPolicy, SyndicationError, SyndicationPipeline,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[tokio::test]
async fn smartnews_feed_parses_and_is_newest_first() {
    init_tracing();

    let repository = InMemoryRepository::new(vec![
        item(1, "news", 1, json!({})),
        item(2, "column", 3, json!({})),
        item(3, "restaurant", 2, json!({})),
    ]);
    let pipeline = pipeline(Arc::new(repository));

    let response = pipeline.generate_at("smartnews", request_time()).await.unwrap();
    info!("SmartNews feed:\n{}", response.body);

    assert_eq!(response.content_type, "text/xml; charset=UTF-8");
    assert_eq!(response.expires, "Tue, 05 Mar 2024 13:00:00 GMT");
    assert!(response.body.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));

    let feed = feed_rs::parser::parse(response.body.as_bytes()).unwrap();
    let links: Vec<&str> = feed.entries.iter().map(|e| e.links[0].href.as_str()).collect();
    assert_eq!(
        links,
        vec![
            "https://news.example.com/2",
            "https://news.example.com/3",
            "https://news.example.com/1"
        ]
    );
    assert_eq!(feed.entries[0].title.as_ref().unwrap().content, "Story 2");
}

#[tokio::test]
async fn page_size_keeps_the_twenty_newest_of_thirty_five() {
    init_tracing();

    let items = (1..=35).map(|id| item(id, "news", id as i64, json!({}))).collect();
    let pipeline = pipeline(Arc::new(InMemoryRepository::new(items)));

    let strategy = pipeline.registry().enabled("smartnews").unwrap();
    let request = RequestContext::new("smartnews", request_time());
    let feed = pipeline.aggregate(strategy, &request).await.unwrap();
    let ids: Vec<u64> = feed.items.iter().map(|item| item.id).collect();
    assert_eq!(ids, (16..=35).rev().collect::<Vec<u64>>());

    let response = pipeline.generate_at("smartnews", request_time()).await.unwrap();
    assert_eq!(response.body.matches("<item>").count(), 20);
}

#[tokio::test]
async fn secondary_sources_compete_on_date_with_the_primary() {
    init_tracing();

    let eligible = json!({ "metadata": { "_delivery_services": ["partner-a"] } });
    let mut items = Vec::new();
    // 25 primary items, every other hour from 02:00
    items.extend((1..=25).map(|id| item(id, "news", id as i64 * 2, eligible.clone())));
    // 5 fresh columns and 5 stale external items
    items.extend((26..=30).map(|id| item(id, "column", id as i64 + 25, eligible.clone())));
    items.extend((31..=35).map(|id| item(id, "yahoo", (id as i64 - 31) * 2 + 1, eligible.clone())));

    let partner = DestinationStrategy {
        descriptor: FeedDescriptor::new("partner-a", "Partner A", &["news"]),
        policy: SelectionPolicy::default().with_secondary(&["column", "yahoo"]),
        fields: FieldPlan::default(),
        renderer: Arc::new(SmartNewsRenderer),
    };
    let pipeline = SyndicationPipeline::builder(site_config(), Arc::new(InMemoryRepository::new(items)))
        .image_probe(Arc::new(StubProbe(None)))
        .add_destination(partner)
        .build()
        .unwrap();

    let strategy = pipeline.registry().enabled("partner-a").unwrap();
    let request = RequestContext::new("partner-a", request_time());
    let feed = pipeline.aggregate(strategy, &request).await.unwrap();
    let ids: Vec<u64> = feed.items.iter().map(|item| item.id).collect();

    let mut expected: Vec<u64> = (26..=30).rev().collect();
    expected.extend((11..=25).rev());
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn criteria_filters_ineligible_free_and_reserved_items() {
    init_tracing();

    let repository = InMemoryRepository::new(vec![
        item(1, "news", 1, json!({})),
        item(2, "news", 2, json!({ "metadata": { "_delivery_services": ["gunosy"] } })),
        item(3, "news", 3, json!({ "metadata": { "_is_free": "null" } })),
        item(4, "news", 4, json!({ "terms": { "news-cat": ["08"] } })),
        item(5, "post", 5, json!({})),
        item(6, "news", 6, json!({ "metadata": { "_delivery_services": "a:1:{i:0;s:9:\"smartnews\";}" } })),
    ]);
    let pipeline = pipeline(Arc::new(repository));

    let strategy = pipeline.registry().enabled("smartnews").unwrap();
    let request = RequestContext::new("smartnews", request_time());
    let feed = pipeline.aggregate(strategy, &request).await.unwrap();
    let ids: Vec<u64> = feed.items.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![6, 1]);
}

#[tokio::test]
async fn trashed_items_use_each_status_vocabulary() {
    init_tracing();

    let repository = InMemoryRepository::new(vec![item(1, "news", 1, json!({ "status": "trash" }))]);
    let pipeline = pipeline(Arc::new(repository));

    let smartnews = pipeline.generate_at("smartnews", request_time()).await.unwrap();
    assert!(smartnews.body.contains("<media:status>deleted</media:status>"));

    let line = pipeline.generate_at("line", request_time()).await.unwrap();
    assert!(line.body.contains("<oa:pubStatus>0</oa:pubStatus>"));

    let gunosy = pipeline.generate_at("gunosy", request_time()).await.unwrap();
    assert!(gunosy.body.contains(r#"<media:status state="deleted"/>"#));
}

#[tokio::test]
async fn gunosy_merges_secondary_sources_without_duplicates() {
    init_tracing();

    let related: Vec<_> = (0..4)
        .map(|i| json!({ "url": format!("https://partner.example/r/{}", i), "title": format!("Partner {}", i) }))
        .collect();
    let repository = InMemoryRepository::new(vec![
        item(1, "news", 1, json!({})),
        item(2, "column", 2, json!({})),
        // no free flag: only reachable through the supplementary query
        item(
            3,
            "yahoo",
            3,
            json!({ "metadata": {
                "_is_free": null,
                "_base_url": "https://partner.example/articles/3",
                "_related_rss_links": related
            }}),
        ),
    ]);
    let pipeline = pipeline(Arc::new(repository));

    let response = pipeline.generate_at("gunosy", request_time()).await.unwrap();
    let body = &response.body;

    assert_eq!(body.matches("<item>").count(), 3);
    assert_eq!(body.matches("<link>https://news.example.com/2</link>").count(), 1);
    assert!(body.contains("<link>https://partner.example/articles/3</link>"));
    assert!(body.contains(r#"<guid isPermaLink="false">https://partner.example/articles/3</guid>"#));
    assert_eq!(body.matches("<gnf:relatedLink ").count(), 3);
    assert!(!body.contains("Partner 3"));

    // newest first across all three queries
    let first = body.find("partner.example/articles/3").unwrap();
    let second = body.find("news.example.com/2").unwrap();
    let third = body.find("news.example.com/1").unwrap();
    assert!(first < second && second < third);
}

#[tokio::test]
async fn line_body_is_curated_and_reflinks_capped() {
    init_tracing();

    let related: Vec<_> = (0..7)
        .map(|i| json!({ "url": format!("https://news.example.com/rel/{}", i), "title": format!("Rel {}", i) }))
        .collect();
    let body = concat!(
        "<div><p>Intro</p></div>\n\n",
        "<blockquote class=\"twitter-tweet\"><p>tweet</p></blockquote>\n",
        "<script async src=\"https://platform.twitter.com/widgets.js\"></script>\n\n",
        "[gallery ids=\"1,2\"]"
    );
    let repository = InMemoryRepository::new(vec![item(
        1,
        "news",
        1,
        json!({ "body_html": body, "metadata": { "_related_links": related } }),
    )]);
    let pipeline = pipeline(Arc::new(repository));

    let response = pipeline.generate_at("line", request_time()).await.unwrap();
    let xml = &response.body;

    assert!(xml.contains(r#"<blockquote class="twitter-tweet">tweet</blockquote>"#));
    assert!(xml.contains("platform.twitter.com/widgets.js"));
    assert!(!xml.contains("<div>"));
    assert!(!xml.contains("[gallery"));
    assert_eq!(xml.matches("<oa:reflink>").count(), 5);

    let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
    assert_eq!(feed.entries.len(), 1);
}

#[tokio::test]
async fn thumbnails_prefer_override_then_featured_image() {
    init_tracing();

    let repository = InMemoryRepository::new(vec![
        item(1, "news", 1, json!({ "metadata": { "_images": [{ "url": "https://cdn.example.com/override.png" }] } })),
        item(2, "news", 2, json!({})),
        item(3, "news", 3, json!({})),
    ])
    .with_featured_image(
        2,
        feed_syndication::FeaturedImage {
            url: "https://cdn.example.com/featured.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            title: "Featured".to_string(),
        },
    );
    let pipeline = pipeline(Arc::new(repository));

    let xml = pipeline.generate_at("gunosy", request_time()).await.unwrap().body;
    assert!(xml.contains(r#"<enclosure url="https://cdn.example.com/override.png" type="image/png" length="0"/>"#));
    assert!(xml.contains(r#"<enclosure url="https://cdn.example.com/featured.jpg" type="image/jpeg" length="0"/>"#));
    assert_eq!(xml.matches("<enclosure ").count(), 2);
}

#[tokio::test]
async fn failed_thumbnail_probe_only_drops_the_enclosure() {
    init_tracing();

    let repository = InMemoryRepository::new(vec![item(
        1,
        "news",
        1,
        json!({ "metadata": { "_images": [{ "url": "https://cdn.example.com/override.png" }] } }),
    )]);
    let pipeline = SyndicationPipeline::builder(site_config(), Arc::new(repository))
        .image_probe(Arc::new(FailingProbe))
        .build()
        .unwrap();

    let xml = pipeline.generate_at("line", request_time()).await.unwrap().body;
    assert_eq!(xml.matches("<item>").count(), 1);
    assert!(!xml.contains("<enclosure"));
}

#[tokio::test]
async fn disabled_and_unknown_destinations_never_query() {
    init_tracing();

    let repository = Arc::new(CountingRepository::new(InMemoryRepository::new(vec![item(
        1,
        "post",
        1,
        json!({}),
    )])));
    let pipeline = SyndicationPipeline::builder(site_config(), repository.clone())
        .image_probe(Arc::new(StubProbe(None)))
        .build()
        .unwrap();

    let err = pipeline.generate_at("goo", request_time()).await.unwrap_err();
    assert!(matches!(err, SyndicationError::DestinationDisabled { ref id } if id == "goo"));

    let err = pipeline.generate_at("myspace", request_time()).await.unwrap_err();
    assert!(matches!(err, SyndicationError::UnknownDestination { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(repository.query_count(), 0);

    // a disabled destination can still be previewed directly
    let strategy = pipeline.registry().get("goo").unwrap();
    let request = RequestContext::new("goo", request_time());
    let feed = pipeline.aggregate(strategy, &request).await.unwrap();
    let xml = pipeline.render(strategy, &feed, &request).await.unwrap();
    assert!(xml.contains(r#"<guid isPermaLink="false">20240101-1</guid>"#));
}

#[tokio::test]
async fn repository_failure_aborts_the_request() {
    init_tracing();

    let pipeline = pipeline(Arc::new(UnavailableRepository));
    let err = pipeline.generate_at("smartnews", request_time()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Repository);
}

#[tokio::test]
async fn empty_selection_still_yields_a_valid_channel() {
    init_tracing();

    let pipeline = pipeline(Arc::new(InMemoryRepository::default()));
    let response = pipeline.generate_at("gunosy", request_time()).await.unwrap();

    assert!(response.body.contains("<channel>"));
    assert!(!response.body.contains("<item>"));
    // no items: build date falls back to the request time
    assert!(response.body.contains("<lastBuildDate>Tue, 05 Mar 2024 21:00:00 +0900</lastBuildDate>"));

    let feed = feed_rs::parser::parse(response.body.as_bytes()).unwrap();
    assert!(feed.entries.is_empty());
}

#[tokio::test]
async fn hooks_and_extra_namespaces_are_written() {
    init_tracing();

    let mut hooks = HookRegistry::new();
    hooks
        .add_namespace("ex", "https://example.com/ns")
        .on_channel(HookPoint::Post, |ctx, sink| sink.text("ex:partner", &ctx.descriptor.label))
        .on_item(HookPoint::Pre, |_, item, sink| sink.text("ex:id", &item.item.id.to_string()));

    let repository = InMemoryRepository::new(vec![item(1, "news", 1, json!({}))]);
    let pipeline = SyndicationPipeline::builder(site_config(), Arc::new(repository))
        .image_probe(Arc::new(StubProbe(None)))
        .hooks(hooks)
        .build()
        .unwrap();

    let xml = pipeline.generate_at("smartnews", request_time()).await.unwrap().body;
    assert!(xml.contains(r#"xmlns:ex="https://example.com/ns""#));
    assert_eq!(xml.matches("<ex:partner>SmartNews</ex:partner>").count(), 1);

    let partner = xml.find("<ex:partner>").unwrap();
    let item_open = xml.find("<item>").unwrap();
    let id = xml.find("<ex:id>1</ex:id>").unwrap();
    let title = xml.find("<title>Story 1</title>").unwrap();
    assert!(partner < item_open);
    assert!(item_open < id && id < title);
}

#[tokio::test]
async fn dates_follow_the_configured_zone() {
    init_tracing();

    let repository = InMemoryRepository::new(vec![item(1, "news", 1, json!({}))]);

    let tokyo = pipeline(Arc::new(repository.clone()));
    let xml = tokyo.generate_at("smartnews", request_time()).await.unwrap().body;
    assert!(xml.contains("<pubDate>Mon, 01 Jan 2024 10:00:00 +0900</pubDate>"));

    let mut config = site_config();
    config.timezone = None;
    let utc = SyndicationPipeline::builder(config, Arc::new(repository))
        .image_probe(Arc::new(StubProbe(None)))
        .build()
        .unwrap();
    let xml = utc.generate_at("smartnews", request_time()).await.unwrap().body;
    assert!(xml.contains("<pubDate>Mon, 01 Jan 2024 01:00:00 +0000</pubDate>"));
}

#[tokio::test]
async fn invalid_timezone_fails_at_build_time() {
    let mut config = site_config();
    config.timezone = Some("Mars/Olympus".to_string());
    let err = SyndicationPipeline::builder(config, Arc::new(InMemoryRepository::default()))
        .image_probe(Arc::new(StubProbe(None)))
        .build()
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn request_context_reaches_every_stage() {
    init_tracing();

    let mut hooks = HookRegistry::new();
    hooks
        .add_namespace("ex", "https://example.com/ns")
        .on_channel(HookPoint::Pre, |ctx, sink| {
            sink.text("ex:request", &ctx.request.request_id.to_string())
        });
    let repository = InMemoryRepository::new(vec![item(1, "news", 1, json!({}))]);
    let pipeline = SyndicationPipeline::builder(site_config(), Arc::new(repository))
        .image_probe(Arc::new(StubProbe(None)))
        .hooks(hooks)
        .build()
        .unwrap();

    let strategy = pipeline.registry().enabled("smartnews").unwrap();
    let request = RequestContext::new("smartnews", request_time());
    let feed = pipeline.aggregate(strategy, &request).await.unwrap();
    assert_eq!(feed.destination_id, request.destination_id);

    let xml = pipeline.render(strategy, &feed, &request).await.unwrap();
    assert!(xml.contains(&format!("<ex:request>{}</ex:request>", request.request_id)));
    // channel pubDate is the request time in the target zone
    assert!(xml.contains("<pubDate>Tue, 05 Mar 2024 21:00:00 +0900</pubDate>"));
}
