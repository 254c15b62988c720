use std::collections::HashMap;

use rand::Rng;
use warden::prelude::*;

// ---------------------------------------------------------------------------
// A toy app: one user table, an in-memory session store, three routes.
// ---------------------------------------------------------------------------

const SESSION_COOKIE: &str = "portal.sid";

fn routes() -> [(&'static str, RouteAccess); 3] {
    [
        ("/", RouteAccess::Public),
        ("/dashboard", RouteAccess::Protected),
        ("/orders?page=2", RouteAccess::Protected),
    ]
}

fn users() -> HashMap<UserId, User> {
    let alice = User::new("alice", CredentialSecret::new("$argon2id$alice"))
        .with_display_name("Alice");
    let bob = User::new("bob", CredentialSecret::new("$argon2id$bob"));
    HashMap::from([(alice.id.clone(), alice), (bob.id.clone(), bob)])
}

/// A browser: just a cookie jar that survives between requests.
#[derive(Default)]
struct Browser {
    cookies: HashMap<String, String>,
}

/// Session storage keyed by the session cookie. Stands in for whatever
/// store a real app uses.
#[derive(Default)]
struct Sessions {
    by_id: HashMap<String, Session>,
}

impl Sessions {
    /// Loads the browser's session, creating one on first contact.
    fn load(&mut self, browser: &mut Browser) -> (String, Session) {
        let id = browser
            .cookies
            .get(SESSION_COOKIE)
            .cloned()
            .unwrap_or_else(|| {
                let id = new_session_id();
                browser.cookies.insert(SESSION_COOKIE.into(), id.clone());
                id
            });
        let session = self.by_id.get(&id).cloned().unwrap_or_default();
        (id, session)
    }

    fn save(&mut self, id: String, session: Session) {
        self.by_id.insert(id, session);
    }
}

/// 128 random bits as 32 hex chars.
fn new_session_id() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Serves one request and returns what the browser would see.
async fn visit(
    warden: &Warden<HashMap<UserId, User>>,
    sessions: &mut Sessions,
    browser: &mut Browser,
    path: &str,
    route: RouteAccess,
) -> String {
    let (sid, mut session) = sessions.load(browser);

    let (ctx, access) = warden
        .handle(&mut session, &mut browser.cookies, route, path)
        .await;

    sessions.save(sid, session);

    match access {
        Access::Redirect(target) => format!("302 -> {target}"),
        Access::Allow => match ctx.current_user() {
            Some(user) => format!(
                "200 {path} (hello, {})",
                user.display_name.as_deref().unwrap_or(user.id.as_str())
            ),
            None => format!("200 {path} (hello, stranger)"),
        },
    }
}

async fn tour(
    label: &str,
    warden: &Warden<HashMap<UserId, User>>,
    sessions: &mut Sessions,
    browser: &mut Browser,
) {
    println!("== {label}");
    for (path, route) in routes() {
        let response = visit(warden, sessions, browser, path, route).await;
        println!("   GET {path:<16} {response}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let warden = WardenBuilder::new().build(users())?;
    let mut sessions = Sessions::default();

    // A first-time visitor with no cookies.
    let mut stranger = Browser::default();
    tour("new visitor", &warden, &mut sessions, &mut stranger).await;

    // A returning visitor whose session expired but who ticked
    // "remember me" last time.
    let mut returning = Browser::default();
    let alice = users()
        .remove(&UserId::new("alice"))
        .ok_or("alice is missing from the user table")?;
    let (name, value) = warden.remember_cookie(&alice)?;
    returning.cookies.insert(name, value);
    tour("returning visitor", &warden, &mut sessions, &mut returning).await;

    // A visitor holding a stale cookie from before a password change.
    let mut stale = Browser::default();
    let token = RememberToken::new("bob", CredentialSecret::new("$argon2id$old"));
    stale
        .cookies
        .insert(warden.cookie_name().into(), JsonCookieCodec.encode(&token)?);
    tour("stale cookie", &warden, &mut sessions, &mut stale).await;
    tracing::info!(
        remember_cookie_kept = stale.cookies.contains_key(warden.cookie_name()),
        "stale visitor after tour"
    );

    Ok(())
}
