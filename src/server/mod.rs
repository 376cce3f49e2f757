//! HTTP server over the content store

mod views;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::QueryError;
use crate::feed;
use crate::query::{paginate, search, Paginated};
use crate::store::ContentStore;
use crate::{Site, CONFIG_FILE};

pub use views::*;

/// Server state shared by all handlers
pub struct ServerState {
    config: SiteConfig,
    public_dir: PathBuf,
    store: RwLock<Arc<ContentStore>>,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    pub fn new(config: SiteConfig, public_dir: PathBuf, store: ContentStore) -> SharedState {
        Arc::new(Self {
            config,
            public_dir,
            store: RwLock::new(Arc::new(store)),
        })
    }

    /// Current snapshot; the lock is released before the caller uses it
    pub fn snapshot(&self) -> Arc<ContentStore> {
        let guard = self.store.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in a rebuilt snapshot
    pub fn replace(&self, store: ContentStore) {
        let mut guard = self.store.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(store);
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        not_found_json(&self.to_string())
    }
}

fn not_found_json(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

/// 301 to a canonical URL
fn moved_permanently(to: &str) -> Response {
    match header::HeaderValue::from_str(to) {
        Ok(location) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
        }
        Err(_) => QueryError::NotFound.into_response(),
    }
}

type HandlerResult = std::result::Result<Response, QueryError>;

/// Build the router
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/page", get(|| async { moved_permanently("/") }))
        .route("/page/:pagination", get(home_page))
        .route("/posts/:slug", get(post))
        .route("/cats/:slug", get(category))
        .route("/cats/:slug/page/:pagination", get(category_page))
        .route("/tags", get(|| async { Redirect::temporary("/") }))
        .route("/tags/:slug", get(tag))
        .route("/tags/:slug/page/:pagination", get(tag_page))
        .route("/search", get(search_posts))
        .route("/feed", get(rss))
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
        .route("/:slug", get(page))
        .fallback(static_file)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool) -> Result<()> {
    let store = site.load_store()?;

    let state = ServerState::new(site.config.clone(), site.public_dir.clone(), store);
    let app = router(Arc::clone(&state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Watching {} for changes...", site.content_dir.display());

        let site = site.clone();
        let state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&site, &state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Rebuild the snapshot whenever content changes
fn watch_and_reload(site: &Site, state: &ServerState) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Debounce to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if site.content_dir.exists() {
        debouncer
            .watcher()
            .watch(&site.content_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", site.content_dir);
    }

    let config_path = site.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        tracing::debug!("{} changes need a restart to take effect", CONFIG_FILE);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path = e.path.to_string_lossy();
                        !path.contains(".git") && !path.contains(".DS_Store") && !path.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }
                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match site.load_store() {
                    Ok(store) => {
                        state.replace(store);
                        tracing::info!("Content reloaded");
                    }
                    // Keep serving the previous snapshot
                    Err(e) => tracing::error!("Reload failed: {:#}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Parse a pagination path segment; anything but plain digits is not a route
fn page_number(raw: &str) -> std::result::Result<usize, QueryError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(QueryError::NotFound);
    }
    raw.parse().map_err(|_| QueryError::NotFound)
}

async fn home(State(state): State<SharedState>) -> HandlerResult {
    render_home(&state, 1)
}

async fn home_page(
    State(state): State<SharedState>,
    Path(pagination): Path<String>,
) -> HandlerResult {
    let num = page_number(&pagination)?;
    if num == 1 {
        return Ok(moved_permanently("/"));
    }
    render_home(&state, num)
}

fn render_home(state: &ServerState, num: usize) -> HandlerResult {
    let store = state.snapshot();
    let config = &state.config;
    let now = Utc::now();

    let posts: Vec<&Post> = store.posts().iter().collect();
    let page = if posts.is_empty() && num == 1 {
        // An empty blog still has a home page
        Paginated {
            items: &posts[..],
            current: 1,
            total_pages: 0,
            page_size: config.pagination.posts,
        }
    } else {
        paginate(&posts, num, config.pagination.posts)?
    };

    let view = HomeView {
        site: SiteData::new(config),
        pagination: PaginationData::new(&page, "/"),
        posts: PostSummary::many(page.items, &store, config, &now),
        featured: store.featured_posts().into_iter().map(NavPost::from).collect(),
        pinned_categories: store.pinned_categories(),
        sidebar: SidebarData::new(&store, config),
    };
    Ok(Json(view).into_response())
}

async fn post(State(state): State<SharedState>, Path(slug): Path<String>) -> HandlerResult {
    let store = state.snapshot();
    let post = store.post(&slug)?;
    let view = PostView::new(post, &store, &state.config, &Utc::now());
    Ok(Json(view).into_response())
}

async fn category(State(state): State<SharedState>, Path(slug): Path<String>) -> HandlerResult {
    render_category(&state, &slug, 1)
}

async fn category_page(
    State(state): State<SharedState>,
    Path((slug, pagination)): Path<(String, String)>,
) -> HandlerResult {
    let num = page_number(&pagination)?;
    if num == 1 {
        let store = state.snapshot();
        let category = store.category(None, Some(&slug))?;
        return Ok(moved_permanently(&category.permalink));
    }
    render_category(&state, &slug, num)
}

fn render_category(state: &ServerState, slug: &str, num: usize) -> HandlerResult {
    let store = state.snapshot();
    let config = &state.config;

    let category = store.category(None, Some(slug))?;
    let posts = store.posts_in_category(category);
    if posts.is_empty() {
        return Err(QueryError::NotFound);
    }
    let page = paginate(&posts, num, config.pagination.category)?;

    let view = CategoryView {
        site: SiteData::new(config),
        category,
        pagination: PaginationData::new(&page, &category.permalink),
        posts: PostSummary::many(page.items, &store, config, &Utc::now()),
    };
    Ok(Json(view).into_response())
}

async fn tag(State(state): State<SharedState>, Path(slug): Path<String>) -> HandlerResult {
    render_tag(&state, &slug, 1)
}

async fn tag_page(
    State(state): State<SharedState>,
    Path((slug, pagination)): Path<(String, String)>,
) -> HandlerResult {
    let num = page_number(&pagination)?;
    if num == 1 {
        let store = state.snapshot();
        let tag = store.tag(None, Some(&slug))?;
        return Ok(moved_permanently(&tag.permalink));
    }
    render_tag(&state, &slug, num)
}

fn render_tag(state: &ServerState, slug: &str, num: usize) -> HandlerResult {
    let store = state.snapshot();
    let config = &state.config;

    let tag = store.tag(None, Some(slug))?;
    let posts = store.posts_with_tag(tag);
    if posts.is_empty() {
        return Err(QueryError::NotFound);
    }
    let page = paginate(&posts, num, config.pagination.tags)?;

    let view = TagView {
        site: SiteData::new(config),
        tag,
        pagination: PaginationData::new(&page, &tag.permalink),
        posts: PostSummary::many(page.items, &store, config, &Utc::now()),
    };
    Ok(Json(view).into_response())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search_posts(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q,
        _ => return Redirect::temporary("/").into_response(),
    };

    let store = state.snapshot();
    let config = &state.config;
    let mut results = search(store.posts(), query);
    results.truncate(config.pagination.search);

    let view = SearchView {
        site: SiteData::new(config),
        query,
        posts: PostSummary::many(&results, &store, config, &Utc::now()),
    };
    Json(view).into_response()
}

async fn rss(State(state): State<SharedState>) -> Response {
    let body = feed::rss(&state.config, &state.snapshot(), Utc::now());
    (
        [
            (header::CONTENT_TYPE, "application/xml"),
            (header::CACHE_CONTROL, feed::FEED_CACHE_CONTROL),
        ],
        body,
    )
        .into_response()
}

async fn sitemap(State(state): State<SharedState>) -> Response {
    let body = feed::sitemap(&state.config, &state.snapshot());
    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

async fn robots(State(state): State<SharedState>) -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], feed::robots(&state.config)).into_response()
}

/// Standalone page; unknown slugs fall through to static files such as
/// `/favicon.ico`
async fn page(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    request: Request<Body>,
) -> Response {
    let store = state.snapshot();
    match store.page(&slug) {
        Ok(page) => Json(PageView {
            site: SiteData::new(&state.config),
            page,
        })
        .into_response(),
        Err(_) => serve_public(&state, request).await,
    }
}

async fn static_file(State(state): State<SharedState>, request: Request<Body>) -> Response {
    serve_public(&state, request).await
}

async fn serve_public(state: &ServerState, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.public_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => {
            QueryError::NotFound.into_response()
        }
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Failed to serve static file: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Category, LoadedContent, Page, Tag};
    use axum::body::to_bytes;
    use chrono::TimeZone;
    use serde_json::Value;
    use tower::ServiceExt;

    fn post(slug: &str, day: u32, category: &str, tags: &[&str]) -> Post {
        let date = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        let mut post = Post::new(slug.to_uppercase(), slug.into(), date, category.into());
        post.tags = tags.iter().map(|t| t.to_string()).collect();
        post.raw = format!("body of {}", slug);
        post
    }

    fn app(public_dir: PathBuf) -> Router {
        let mut config = SiteConfig {
            website: "https://example.com".into(),
            ..Default::default()
        };
        config.pagination.posts = 2;
        config.pagination.category = 2;
        config.pagination.tags = 2;

        let content = LoadedContent {
            posts: vec![
                post("one", 1, "Notes", &["rust"]),
                post("two", 2, "Notes", &["rust"]),
                post("three", 3, "Notes", &["rust", "life"]),
                post("four", 4, "Essays", &[]),
            ],
            pages: vec![Page::new(
                "About".into(),
                "about".into(),
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            )],
            tags: vec![
                Tag::new("rust", "rust"),
                Tag::new("life", "life"),
                Tag::new("unused", "unused"),
            ],
            categories: vec![Category::new("Notes", "notes"), Category::new("Empty", "empty")],
        };
        let store = ContentStore::build(&config, content).unwrap();
        router(ServerState::new(config, public_dir, store))
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_home_lists_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let response = get(app(dir.path().into()), "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["posts"][0]["slug"], "four");
        assert_eq!(body["posts"][1]["slug"], "three");
        assert_eq!(body["pagination"]["total"], 2);
        assert_eq!(body["pagination"]["next_link"], "/page/2");
    }

    #[tokio::test]
    async fn test_page_one_redirects_to_canonical() {
        let dir = tempfile::tempdir().unwrap();
        for (uri, target) in [
            ("/page/1", "/"),
            ("/page", "/"),
            ("/cats/notes/page/1", "/cats/notes"),
            ("/tags/rust/page/1", "/tags/rust"),
        ] {
            let response = get(app(dir.path().into()), uri).await;
            assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY, "{}", uri);
            assert_eq!(location(&response), target);
        }
    }

    #[tokio::test]
    async fn test_page_one_of_unknown_taxonomy_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        for uri in [
            "/cats/missing/page/1",
            "/tags/missing/page/1",
            "/cats/%0A/page/1",
            "/tags/%0A/page/1",
        ] {
            let response = get(app(dir.path().into()), uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_invalid_pages_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        for uri in ["/page/0", "/page/3", "/page/abc", "/page/+2", "/cats/notes/page/9"] {
            let response = get(app(dir.path().into()), uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_second_page() {
        let dir = tempfile::tempdir().unwrap();
        let body = json(get(app(dir.path().into()), "/cats/notes/page/2").await).await;
        assert_eq!(body["category"]["name"], "Notes");
        assert_eq!(body["posts"][0]["slug"], "one");
        assert_eq!(body["pagination"]["prev_link"], "/cats/notes");
    }

    #[tokio::test]
    async fn test_unknown_and_empty_taxonomies_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        for uri in ["/cats/missing", "/cats/empty", "/tags/unused", "/posts/missing"] {
            let response = get(app(dir.path().into()), uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
            assert!(json(response).await["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_post_detail_has_neighbours() {
        let dir = tempfile::tempdir().unwrap();
        let body = json(get(app(dir.path().into()), "/posts/three").await).await;
        assert_eq!(body["title"], "THREE");
        assert_eq!(body["prev"]["permalink"], "/posts/four");
        assert_eq!(body["next"]["permalink"], "/posts/two");
        assert_eq!(body["tags"][1]["permalink"], "/tags/life");
    }

    #[tokio::test]
    async fn test_tag_listing() {
        let dir = tempfile::tempdir().unwrap();
        let body = json(get(app(dir.path().into()), "/tags/rust").await).await;
        assert_eq!(body["tag"]["count"], 3);
        assert_eq!(body["posts"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_redirects_without_target() {
        let dir = tempfile::tempdir().unwrap();
        for uri in ["/tags", "/search", "/search?q=%20"] {
            let response = get(app(dir.path().into()), uri).await;
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{}", uri);
            assert_eq!(location(&response), "/");
        }
    }

    #[tokio::test]
    async fn test_search() {
        let dir = tempfile::tempdir().unwrap();
        let body = json(get(app(dir.path().into()), "/search?q=life").await).await;
        assert_eq!(body["query"], "life");
        assert_eq!(body["posts"][0]["slug"], "three");
    }

    #[tokio::test]
    async fn test_feed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let response = get(app(dir.path().into()), "/feed").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            feed::FEED_CACHE_CONTROL
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("https://example.com/posts/four"));
    }

    #[tokio::test]
    async fn test_pages_and_static_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("favicon.ico"), "icon").unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images").join("a.txt"), "hello").unwrap();

        let body = json(get(app(dir.path().into()), "/about").await).await;
        assert_eq!(body["title"], "About");

        let response = get(app(dir.path().into()), "/favicon.ico").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get(app(dir.path().into()), "/images/a.txt").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get(app(dir.path().into()), "/nothing/here").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_snapshot_swap() {
        let config = SiteConfig::default();
        let empty = ContentStore::build(&config, LoadedContent::default()).unwrap();
        let state = ServerState::new(config.clone(), PathBuf::new(), empty);

        let before = state.snapshot();
        let content = LoadedContent {
            posts: vec![post("one", 1, "Notes", &[])],
            ..Default::default()
        };
        state.replace(ContentStore::build(&config, content).unwrap());

        assert!(before.posts().is_empty());
        assert_eq!(state.snapshot().posts().len(), 1);
    }
}
