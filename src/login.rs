use axum::{
    Form,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use lazy_static::lazy_static;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "session";

/// Message shown for any failed login
pub const LOGIN_ERROR: &str = "账号或密码错误";

lazy_static! {
    /// The two fixed accounts (username → plaintext password)
    static ref ACCOUNTS: HashMap<&'static str, &'static str> =
        HashMap::from([("admin", "1234"), ("user1", "1111")]);
}

/// Credential data for login
///
/// Used to receive the login form from the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserCredentials {
    /// Username for login
    pub username: String,

    /// Password in plaintext
    pub password: String,
}

/// Username of the authenticated caller
///
/// Inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// Verify user credentials
///
/// Checks whether the username and password exactly match one of the fixed
/// accounts. An unknown user and a wrong password are indistinguishable.
///
/// # Arguments
/// * `username` - Username to verify
/// * `password` - Password to verify
///
/// # Returns
/// * `bool` - True if the pair matches an account
///
/// # Examples
/// ```
/// use labour_tracker::login::verify_user;
///
/// assert!(verify_user("admin", "1234"));
/// assert!(!verify_user("admin", "1111"));
/// ```
pub fn verify_user(username: &str, password: &str) -> bool {
    ACCOUNTS
        .get(username)
        .is_some_and(|expected| *expected == password)
}

/// Active login sessions
///
/// Maps a session id (the `session` cookie value) to the logged-in username.
/// Sessions live until logout or process restart; there is no expiry.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    /// Create a new user session
    ///
    /// # Arguments
    /// * `username` - The username to create a session for
    ///
    /// # Returns
    /// * `String` - A unique session ID
    pub fn create(&self, username: &str) -> String {
        let session_id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(session_id.clone(), username.to_string());
        session_id
    }

    /// Validate a session
    ///
    /// # Arguments
    /// * `session_id` - The session ID to validate
    ///
    /// # Returns
    /// * `Option<String>` - The username for the session if it exists
    pub fn validate(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.read().unwrap();
        sessions.get(session_id).cloned()
    }

    /// Drop a session, returning the username it belonged to
    pub fn remove(&self, session_id: &str) -> Option<String> {
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serve the login page HTML
///
/// # Returns
/// * `Html<&'static str>` - The login page HTML
pub async fn serve_login_page() -> Html<&'static str> {
    Html(include_str!("./static/login.html"))
}

/// Handle user login requests
///
/// Validates the submitted form and, on a match, stores a session and sets
/// the session cookie. The cookie has no max-age, so it lasts for the
/// browser session.
///
/// # Arguments
/// * `sessions` - Session store from the application state
/// * `jar` - Cookie jar for storing the session cookie
/// * `credentials` - Form data containing the username and password
///
/// # Returns
/// * `Response` - Redirect to the tracker page, or back to the login page
///   with an error message
pub async fn handle_login(
    State(sessions): State<Arc<SessionStore>>,
    jar: CookieJar,
    Form(credentials): Form<UserCredentials>,
) -> Response {
    if !verify_user(&credentials.username, &credentials.password) {
        warn!("Failed login attempt for '{}'", credentials.username);
        return Redirect::to(&format!(
            "/login?error={}",
            urlencoding::encode(LOGIN_ERROR)
        ))
        .into_response();
    }

    let session_id = sessions.create(&credentials.username);
    info!("User '{}' logged in", credentials.username);
    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true);
    (jar.add(cookie), Redirect::to("/")).into_response()
}

/// Handle user logout
///
/// Forgets the session and clears the session cookie.
///
/// # Arguments
/// * `sessions` - Session store from the application state
/// * `jar` - Cookie jar containing the session cookie
///
/// # Returns
/// * `(CookieJar, Redirect)` - Modified cookie jar and redirect to the login page
pub async fn handle_logout(
    State(sessions): State<Arc<SessionStore>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(username) = sessions.remove(cookie.value()) {
            info!("User '{}' logged out", username);
        }
    }

    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/login"),
    )
}

/// Authentication middleware
///
/// Lets requests with a valid session through, with the username attached
/// as a [`CurrentUser`] extension. Anything else is turned away: API calls
/// get a 401, pages are redirected to the login form.
///
/// # Arguments
/// * `sessions` - Session store from the application state
/// * `jar` - Cookie jar containing session information
/// * `request` - The incoming request
/// * `next` - Next middleware in the chain
///
/// # Returns
/// * `Response` - Either passes the request through or rejects it
pub async fn require_auth(
    State(sessions): State<Arc<SessionStore>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        if let Some(username) = sessions.validate(session_cookie.value()) {
            request.extensions_mut().insert(CurrentUser(username));
            return next.run(request).await;
        }
    }

    if request.uri().path().starts_with("/api/") {
        return (StatusCode::UNAUTHORIZED, "请先登录").into_response();
    }
    Redirect::to("/login").into_response()
}
