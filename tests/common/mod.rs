//! In-process stand-in for the MovieMatch API.
//!
//! Mirrors the real server's routes and response shapes closely enough to
//! exercise cookies, status codes and error bodies end to end.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::Notify;

use moviematch_client::config::Config;

const SESSION_COOKIE: &str = "session";

#[derive(Clone)]
struct Account {
    id: i64,
    email: String,
    password: String,
    display_name: String,
}

#[derive(Clone)]
struct Saved {
    id: i64,
    user_id: i64,
    movie: Value,
}

#[derive(Default)]
pub struct FakeApi {
    accounts: Mutex<Vec<Account>>,
    sessions: Mutex<HashMap<String, i64>>,
    library: Mutex<Vec<Saved>>,
    next_id: AtomicI64,
    me_calls: AtomicUsize,
    fail_logout: AtomicBool,
    fail_login: AtomicBool,
    hold_identity: AtomicBool,
    identity_released: Notify,
}

impl FakeApi {
    pub fn with_account(self, email: &str, password: &str, display_name: &str) -> Self {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.accounts.lock().unwrap().push(Account {
            id,
            email: email.to_string(),
            password: password.to_string(),
            display_name: display_name.to_string(),
        });
        self
    }

    /// Number of `GET /api/auth/me` requests served so far
    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    /// Makes `POST /api/auth/logout` answer 500 with a plain-text body
    pub fn fail_logout(&self) {
        self.fail_logout.store(true, Ordering::SeqCst);
    }

    /// Makes `POST /api/auth/login` answer 500 with an HTML body
    pub fn fail_login(&self) {
        self.fail_login.store(true, Ordering::SeqCst);
    }

    /// Makes `GET /api/auth/me` wait for [`FakeApi::release_identity`]
    pub fn hold_identity(self) -> Self {
        self.hold_identity.store(true, Ordering::SeqCst);
        self
    }

    pub fn release_identity(&self) {
        self.hold_identity.store(false, Ordering::SeqCst);
        self.identity_released.notify_one();
    }

    fn session_token(headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, token)| token.to_string())
    }

    fn session_user(&self, headers: &HeaderMap) -> Option<Account> {
        let token = Self::session_token(headers)?;
        let user_id = *self.sessions.lock().unwrap().get(&token)?;
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|account| account.id == user_id)
            .cloned()
    }

    fn start_session(&self, user_id: i64) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions.lock().unwrap().insert(token.clone(), user_id);
        format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, token)
    }
}

/// Starts the fake API on an ephemeral port and returns a config pointing at it
pub async fn spawn_fake_api(api: FakeApi) -> (Arc<FakeApi>, Config) {
    let api = Arc::new(api);

    let app = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/search", get(search_users))
        .route("/api/movies/search", get(search_movies))
        .route("/api/movies/popular", get(popular_movies))
        .route("/api/movies/:movie_id", get(movie))
        .route("/api/library", get(library))
        .route("/api/library/add", post(add_to_library))
        .route("/api/library/remove/:movie_id", delete(remove_from_library))
        .route("/api/recs", post(recommendations))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (api, Config::default().with_api_url(format!("http://{}", addr)))
}

/// Config pointing at a port nothing listens on
pub async fn unreachable_config() -> Config {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Config::default().with_api_url(format!("http://{}", addr))
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "Unauthorized")
}

fn identity(account: &Account) -> Value {
    json!({
        "id": account.id,
        "email": account.email,
        "display_name": account.display_name,
    })
}

fn catalog() -> Vec<Value> {
    vec![
        json!({
            "id": 603,
            "title": "The Matrix",
            "overview": "A hacker learns the truth about his reality.",
            "poster_url": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
            "release_date": "1999-03-30",
            "vote_average": 8.2
        }),
        json!({
            "id": 27205,
            "title": "Inception",
            "overview": "A thief who steals corporate secrets through dream-sharing.",
            "poster_url": "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg",
            "release_date": "2010-07-15",
            "vote_average": 8.4
        }),
    ]
}

fn page_of(results: Vec<Value>, page: u32) -> Value {
    json!({
        "total_results": results.len(),
        "results": results,
        "page": page,
        "total_pages": 1,
    })
}

async fn me(State(api): State<Arc<FakeApi>>, headers: HeaderMap) -> Response {
    api.me_calls.fetch_add(1, Ordering::SeqCst);
    if api.hold_identity.load(Ordering::SeqCst) {
        api.identity_released.notified().await;
    }
    match api.session_user(&headers) {
        Some(account) => Json(identity(&account)).into_response(),
        None => unauthorized(),
    }
}

async fn login(State(api): State<Arc<FakeApi>>, Json(body): Json<Value>) -> Response {
    if api.fail_login.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Internal Server Error</h1>"),
        )
            .into_response();
    }
    let email = body["email"].as_str().unwrap_or_default().trim().to_lowercase();
    let password = body["password"].as_str().unwrap_or_default();

    let account = api
        .accounts
        .lock()
        .unwrap()
        .iter()
        .find(|account| account.email == email && account.password == password)
        .cloned();

    match account {
        Some(account) => {
            let cookie = api.start_session(account.id);
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(json!({
                    "message": "Logged in successfully",
                    "user": { "id": account.id, "email": account.email }
                })),
            )
                .into_response()
        }
        None => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn register(State(api): State<Arc<FakeApi>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().trim().to_lowercase();
    let password = body["password"].as_str().unwrap_or_default();
    let display_name = body["display_name"].as_str().unwrap_or_default();

    if email.is_empty() || password.is_empty() || display_name.is_empty() {
        return error(
            StatusCode::BAD_REQUEST,
            "Email, password, and display name are required",
        );
    }

    let account = {
        let mut accounts = api.accounts.lock().unwrap();
        if accounts.iter().any(|account| account.email == email) {
            return error(StatusCode::BAD_REQUEST, "Email already registered");
        }
        let account = Account {
            id: api.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            email,
            password: password.to_string(),
            display_name: display_name.to_string(),
        };
        accounts.push(account.clone());
        account
    };

    let cookie = api.start_session(account.id);
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(identity(&account)),
    )
        .into_response()
}

async fn logout(State(api): State<Arc<FakeApi>>, headers: HeaderMap) -> Response {
    if api.fail_logout.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database is locked").into_response();
    }
    if api.session_user(&headers).is_none() {
        return unauthorized();
    }

    if let Some(token) = FakeApi::session_token(&headers) {
        api.sessions.lock().unwrap().remove(&token);
    }
    (
        StatusCode::OK,
        [(header::SET_COOKIE, format!("{}=; Path=/; Max-Age=0", SESSION_COOKIE))],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

async fn search_users(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if api.session_user(&headers).is_none() {
        return unauthorized();
    }
    let query = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let results: Vec<Value> = api
        .accounts
        .lock()
        .unwrap()
        .iter()
        .filter(|account| account.display_name.to_lowercase().contains(&query))
        .map(identity)
        .collect();
    Json(json!({ "results": results })).into_response()
}

async fn search_movies(Query(params): Query<HashMap<String, String>>) -> Response {
    let query = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let page = params
        .get("page")
        .and_then(|page| page.parse().ok())
        .unwrap_or(1);
    let results = catalog()
        .into_iter()
        .filter(|movie| {
            movie["title"]
                .as_str()
                .map_or(false, |title| title.to_lowercase().contains(&query))
        })
        .collect();
    Json(page_of(results, page)).into_response()
}

async fn popular_movies(Query(params): Query<HashMap<String, String>>) -> Response {
    let page = params
        .get("page")
        .and_then(|page| page.parse().ok())
        .unwrap_or(1);
    Json(page_of(catalog(), page)).into_response()
}

async fn movie(Path(movie_id): Path<i64>) -> Response {
    match catalog().into_iter().find(|movie| movie["id"] == movie_id) {
        Some(movie) => Json(movie).into_response(),
        None => error(StatusCode::NOT_FOUND, "Movie not found"),
    }
}

fn library_item(saved: &Saved) -> Value {
    json!({
        "id": saved.id,
        "user_id": saved.user_id,
        "movie_id": saved.movie["id"],
        "title": saved.movie["title"],
        "poster_path": saved.movie["poster_path"],
        "release_date": saved.movie["release_date"],
        "vote_average": saved.movie["vote_average"],
        "created_at": "2025-01-04T18:22:10.123456Z",
    })
}

async fn library(State(api): State<Arc<FakeApi>>, headers: HeaderMap) -> Response {
    let Some(account) = api.session_user(&headers) else {
        return unauthorized();
    };
    let items: Vec<Value> = api
        .library
        .lock()
        .unwrap()
        .iter()
        .rev()
        .filter(|saved| saved.user_id == account.id)
        .map(library_item)
        .collect();
    Json(items).into_response()
}

async fn add_to_library(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(account) = api.session_user(&headers) else {
        return unauthorized();
    };
    let movie = body["movie"].clone();
    if movie.get("id").is_none() || movie.get("title").is_none() {
        return error(StatusCode::BAD_REQUEST, "Missing required fields: id, title");
    }

    let mut library = api.library.lock().unwrap();
    if library
        .iter()
        .any(|saved| saved.user_id == account.id && saved.movie["id"] == movie["id"])
    {
        return Json(json!({ "message": "Already in library" })).into_response();
    }

    let saved = Saved {
        id: api.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        user_id: account.id,
        movie,
    };
    let item = library_item(&saved);
    library.push(saved);

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Added", "item": item })),
    )
        .into_response()
}

async fn remove_from_library(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Path(movie_id): Path<i64>,
) -> Response {
    let Some(account) = api.session_user(&headers) else {
        return unauthorized();
    };
    let mut library = api.library.lock().unwrap();
    let before = library.len();
    library.retain(|saved| !(saved.user_id == account.id && saved.movie["id"] == movie_id));
    if library.len() == before {
        return error(StatusCode::NOT_FOUND, "Not found");
    }
    Json(json!({ "message": "Removed", "movie_id": movie_id })).into_response()
}

async fn recommendations(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if api.session_user(&headers).is_none() {
        return unauthorized();
    }
    let Some(user_ids) = body["user_ids"].as_array() else {
        return error(StatusCode::BAD_REQUEST, "Missing user_ids in request body");
    };

    let why = format!("Picked for a group of {}", user_ids.len() + 1);
    let results: Vec<Value> = catalog()
        .into_iter()
        .map(|mut movie| {
            movie["why"] = json!(why);
            movie
        })
        .collect();
    Json(json!({ "results": results })).into_response()
}
