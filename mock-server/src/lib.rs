//! In-memory stand-in for the library management backend.
//!
//! Implements the `/api/auth/*` and `/api/admin/*` endpoints consumed by the
//! console client. Sessions are tracked with a `session` cookie holding a
//! random UUID; every error body has the shape `{"error": ..., "status": ...}`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";
pub const ADMIN_EMAIL: &str = "admin@library.com";
pub const ADMIN_PASSWORD: &str = "admin123";

const STATUS_PENDING: &str = "PENDING";
const STATUS_APPROVED: &str = "APPROVED";
const STATUS_REJECTED: &str = "REJECTED";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub role_id: i64,
    pub role_name: String,
}

#[derive(Clone, Debug)]
pub struct UserRecord {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role_id: i64,
    pub status: String,
    pub approved_by: Option<i64>,
    pub approved_at: Option<String>,
    pub created_at: String,
}

#[derive(Clone, Debug)]
pub struct AuditEntry {
    pub user_id: Option<i64>,
    pub action: String,
    pub table_name: String,
    pub record_id: i64,
    pub timestamp: String,
}

/// Book circulation counters reported by `/api/admin/stats`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inventory {
    pub total_books: i64,
    pub books_borrowed: i64,
    pub overdue_books: i64,
}

/// Everything the mock backend knows about.
#[derive(Debug)]
pub struct Library {
    roles: Vec<Role>,
    users: Vec<UserRecord>,
    audit: Vec<AuditEntry>,
    sessions: HashMap<Uuid, i64>,
    inventory: Inventory,
    next_user_id: i64,
}

impl Library {
    /// Seeded with the Student/Teacher/Admin roles and one approved admin.
    pub fn seeded() -> Self {
        let roles = ["Student", "Teacher", "Admin"]
            .iter()
            .zip(1..)
            .map(|(name, role_id)| Role {
                role_id,
                role_name: (*name).to_string(),
            })
            .collect();
        let mut library = Self {
            roles,
            users: Vec::new(),
            audit: Vec::new(),
            sessions: HashMap::new(),
            inventory: Inventory::default(),
            next_user_id: 1,
        };
        library.insert_user("System Admin", ADMIN_EMAIL, ADMIN_PASSWORD, "0000000000", 3, STATUS_APPROVED);
        library
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    /// Add a user directly, bypassing registration. Returns the new id.
    pub fn insert_user(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
        role_id: i64,
        status: &str,
    ) -> i64 {
        let user_id = self.next_user_id;
        self.next_user_id += 1;
        self.users.push(UserRecord {
            user_id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: phone.to_string(),
            role_id,
            status: status.to_string(),
            approved_by: None,
            approved_at: None,
            created_at: iso_now(),
        });
        user_id
    }

    fn role_name(&self, role_id: i64) -> Option<&str> {
        self.roles
            .iter()
            .find(|r| r.role_id == role_id)
            .map(|r| r.role_name.as_str())
    }

    fn user(&self, user_id: i64) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    fn log(&mut self, user_id: Option<i64>, action: &str, record_id: i64) {
        self.audit.push(AuditEntry {
            user_id,
            action: action.to_string(),
            table_name: "users".to_string(),
            record_id,
            timestamp: iso_now(),
        });
    }

    fn summary(&self, user: &UserRecord) -> Value {
        json!({
            "user_id": user.user_id,
            "name": user.name,
            "email": user.email,
            "role_name": self.role_name(user.role_id),
            "status": user.status,
        })
    }

    fn profile(&self, user: &UserRecord) -> Value {
        json!({
            "user_id": user.user_id,
            "name": user.name,
            "email": user.email,
            "phone": user.phone,
            "role_name": self.role_name(user.role_id),
            "status": user.status,
            "created_at": user.created_at,
            "approved_at": user.approved_at,
        })
    }
}

pub type Db = Arc<RwLock<Library>>;

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    let message = message.into();
    (
        status,
        Json(json!({ "error": message, "status": status.as_u16() })),
    )
}

fn iso_now() -> String {
    chrono::Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

pub fn app() -> Router {
    app_with(Library::seeded())
}

pub fn app_with(library: Library) -> Router {
    let db: Db = Arc::new(RwLock::new(library));
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/auth/roles", get(roles))
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/recent-activities", get(recent_activities))
        .route("/api/admin/pending-users", get(pending_users))
        .route("/api/admin/verify-user/{id}", put(verify_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Library::seeded()).await
}

pub async fn serve(listener: TcpListener, library: Library) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(library).layer(TraceLayer::new_for_http())).await
}

fn session_user(db: &Library, jar: &CookieJar) -> Option<i64> {
    let id: Uuid = jar.get(SESSION_COOKIE)?.value().parse().ok()?;
    db.sessions.get(&id).copied()
}

fn require_login(db: &Library, jar: &CookieJar) -> Result<i64, Failure> {
    session_user(db, jar).ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Authentication required"))
}

fn require_admin(db: &Library, jar: &CookieJar) -> Result<i64, Failure> {
    let user_id = require_login(db, jar)?;
    let is_admin = db
        .user(user_id)
        .and_then(|u| db.role_name(u.role_id))
        .is_some_and(|name| name == "Admin");
    if !is_admin {
        return Err(failure(StatusCode::FORBIDDEN, "Admin access required"));
    }
    Ok(user_id)
}

#[derive(Deserialize)]
struct RegisterBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    phone: Option<String>,
    role_id: Option<i64>,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct VerifyBody {
    action: String,
}

fn required(field: &str, value: Option<String>) -> Result<String, Failure> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, format!("{field} is required")))
}

async fn register(State(db): State<Db>, body: Bytes) -> Result<(StatusCode, Json<Value>), Failure> {
    let input: RegisterBody = serde_json::from_slice(&body)
        .map_err(|_| failure(StatusCode::BAD_REQUEST, "Invalid JSON body"))?;
    let name = required("name", input.name)?;
    let email = required("email", input.email)?;
    let password = required("password", input.password)?;
    let phone = required("phone", input.phone)?;
    let role_id = input
        .role_id
        .filter(|id| *id != 0)
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "role_id is required"))?;

    let mut db = db.write().await;
    if db.users.iter().any(|u| u.email == email) {
        return Err(failure(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    if db.role_name(role_id).is_none() {
        return Err(failure(StatusCode::BAD_REQUEST, "Invalid role_id"));
    }
    let user_id = db.insert_user(&name, &email, &password, &phone, role_id, STATUS_PENDING);
    db.log(Some(user_id), "CREATE", user_id);
    tracing::info!(user_id, "registered user");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful. Please wait for admin approval.",
            "user_id": user_id,
        })),
    ))
}

async fn login(
    State(db): State<Db>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<Value>), Failure> {
    let input: LoginBody = serde_json::from_slice(&body)
        .map_err(|_| failure(StatusCode::BAD_REQUEST, "Email and password are required"))?;

    let mut db = db.write().await;
    let user = db
        .users
        .iter()
        .find(|u| u.email == input.email && u.password == input.password)
        .cloned()
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid email or password"))?;
    if user.status != STATUS_APPROVED {
        return Err(failure(
            StatusCode::FORBIDDEN,
            format!("Account status: {}. Please wait for admin approval.", user.status),
        ));
    }

    let session = Uuid::new_v4();
    db.sessions.insert(session, user.user_id);
    db.log(Some(user.user_id), "LOGIN", user.user_id);
    tracing::info!(user_id = user.user_id, "login");

    let cookie = Cookie::build((SESSION_COOKIE, session.to_string()))
        .path("/")
        .http_only(true);
    let body = json!({ "message": "Login successful", "user": db.summary(&user) });
    Ok((jar.add(cookie), Json(body)))
}

async fn logout(State(db): State<Db>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let mut db = db.write().await;
    if let Some(user_id) = session_user(&db, &jar) {
        db.log(Some(user_id), "LOGOUT", user_id);
    }
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| c.value().parse::<Uuid>().ok())
    {
        db.sessions.remove(&id);
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(json!({ "message": "Logout successful" })))
}

async fn me(State(db): State<Db>, jar: CookieJar) -> Result<Json<Value>, Failure> {
    let db = db.read().await;
    let user_id = require_login(&db, &jar)?;
    let user = db
        .user(user_id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
    Ok(Json(json!({ "user": db.profile(user) })))
}

async fn roles(State(db): State<Db>) -> Json<Vec<Role>> {
    Json(db.read().await.roles.clone())
}

async fn stats(State(db): State<Db>, jar: CookieJar) -> Result<Json<Value>, Failure> {
    let db = db.read().await;
    require_admin(&db, &jar)?;
    let total_students = db
        .users
        .iter()
        .filter(|u| u.status == STATUS_APPROVED && db.role_name(u.role_id) == Some("Student"))
        .count();
    let pending_verifications = db.users.iter().filter(|u| u.status == STATUS_PENDING).count();
    Ok(Json(json!({
        "total_students": total_students,
        "total_books": db.inventory.total_books,
        "books_borrowed": db.inventory.books_borrowed,
        "overdue_books": db.inventory.overdue_books,
        "pending_verifications": pending_verifications,
    })))
}

async fn recent_activities(State(db): State<Db>, jar: CookieJar) -> Result<Json<Vec<Value>>, Failure> {
    let db = db.read().await;
    require_admin(&db, &jar)?;
    let activities = db
        .audit
        .iter()
        .rev()
        .take(5)
        .map(|entry| {
            let user_name = entry
                .user_id
                .and_then(|id| db.user(id))
                .map_or("System", |u| u.name.as_str());
            json!({
                "user_name": user_name,
                "action": entry.action,
                "table_name": entry.table_name,
                "timestamp": entry.timestamp,
            })
        })
        .collect();
    Ok(Json(activities))
}

async fn pending_users(State(db): State<Db>, jar: CookieJar) -> Result<Json<Vec<Value>>, Failure> {
    let db = db.read().await;
    require_admin(&db, &jar)?;
    let pending = db
        .users
        .iter()
        .rev()
        .filter(|u| u.status == STATUS_PENDING)
        .map(|u| {
            json!({
                "user_id": u.user_id,
                "name": u.name,
                "email": u.email,
                "phone": u.phone,
                "role_name": db.role_name(u.role_id),
                "created_at": u.created_at,
            })
        })
        .collect();
    Ok(Json(pending))
}

async fn verify_user(
    State(db): State<Db>,
    jar: CookieJar,
    Path(user_id): Path<i64>,
    body: Bytes,
) -> Result<Json<Value>, Failure> {
    let mut db = db.write().await;
    let admin_id = require_admin(&db, &jar)?;
    let input: VerifyBody = serde_json::from_slice(&body).map_err(|_| {
        failure(
            StatusCode::BAD_REQUEST,
            "action field is required (approve or reject)",
        )
    })?;
    let action = input.action.to_lowercase();
    let (new_status, verb) = match action.as_str() {
        "approve" => (STATUS_APPROVED, "approved"),
        "reject" => (STATUS_REJECTED, "rejected"),
        _ => {
            return Err(failure(
                StatusCode::BAD_REQUEST,
                r#"action must be "approve" or "reject""#,
            ))
        }
    };

    let user = db
        .users
        .iter_mut()
        .find(|u| u.user_id == user_id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
    if user.status != STATUS_PENDING {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            format!("User status is already {}", user.status),
        ));
    }
    user.status = new_status.to_string();
    user.approved_by = Some(admin_id);
    user.approved_at = Some(iso_now());
    db.log(Some(admin_id), &action.to_uppercase(), user_id);
    tracing::info!(user_id, admin_id, action = %action, "verified user");

    Ok(Json(json!({ "message": format!("User {verb} successfully") })))
}
