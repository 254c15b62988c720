//! Integration tests for the full request pipeline: cookie decoding,
//! identity resolution, effect application and the login gate.

use std::collections::HashMap;
use std::sync::Arc;

use warden::prelude::*;

// =========================================================================
// Mock persistence
// =========================================================================

/// A user store that is always down.
struct DownStore;

impl UserLookup for DownStore {
    async fn find_by_identifier(
        &self,
        _uid: &UserId,
    ) -> Result<Option<User>, LookupError> {
        Err(LookupError::Backend("database unavailable".into()))
    }
}

// =========================================================================
// Helpers
// =========================================================================

const COOKIE: &str = "last_logged_in_user";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warden=trace,warden_session=trace,warden_gate=trace")
        .with_test_writer()
        .try_init();
}

fn u1() -> User {
    User::new("u1", CredentialSecret::new("h(p1)")).with_display_name("One")
}

fn store() -> HashMap<UserId, User> {
    HashMap::from([(u1().id, u1())])
}

fn default_warden() -> Warden<HashMap<UserId, User>> {
    init_tracing();
    WardenBuilder::new().build(store()).expect("default config is valid")
}

/// A jar holding a JSON remember-me cookie in the browser's wire form.
fn jar_with_token(uid: &str, secret: &str) -> HashMap<String, String> {
    let token = RememberToken::new(uid, CredentialSecret::new(secret));
    let value = JsonCookieCodec.encode(&token).expect("encodes");
    HashMap::from([(COOKIE.to_string(), value)])
}

// =========================================================================
// Scenarios
// =========================================================================

#[tokio::test]
async fn test_scenario_a_valid_cookie_logs_visitor_in() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = jar_with_token("u1", "h(p1)");
    let cookie_before = jar.get(COOKIE).cloned();

    let (ctx, access) = warden
        .handle(&mut session, &mut jar, RouteAccess::Protected, "/dashboard")
        .await;

    assert_eq!(ctx.current_user(), Some(&u1()));
    assert_eq!(session.current_user(), Some(&u1()));
    assert_eq!(jar.get(COOKIE).cloned(), cookie_before, "cookie untouched");
    assert_eq!(access, Access::Allow);
}

#[tokio::test]
async fn test_scenario_b_wrong_secret_clears_cookie() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = jar_with_token("u1", "wrong");

    let ctx = warden.resolve(&mut session, &mut jar).await;

    assert!(!ctx.is_authenticated());
    assert!(!session.is_authenticated());
    assert!(jar.get(COOKIE).is_none(), "cookie must be cleared");
}

#[tokio::test]
async fn test_scenario_c_anonymous_redirects_with_original_path() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = HashMap::<String, String>::new();

    let (_, access) = warden
        .handle(&mut session, &mut jar, RouteAccess::Protected, "/dashboard")
        .await;

    assert_eq!(
        access,
        Access::Redirect("/account/login?redirect=/dashboard".into())
    );
}

// =========================================================================
// Route handling
// =========================================================================

#[tokio::test]
async fn test_public_route_never_redirects_but_still_resolves() {
    let warden = default_warden();

    // Anonymous visitor on a public page.
    let mut session = Session::new();
    let mut jar = HashMap::<String, String>::new();
    let (ctx, access) = warden
        .handle(&mut session, &mut jar, RouteAccess::Public, "/")
        .await;
    assert!(!ctx.is_authenticated());
    assert_eq!(access, Access::Allow);

    // Logged-in visitor on a public page gets a personalized context.
    let mut session = Session::with_user(u1());
    let (ctx, access) = warden
        .handle(&mut session, &mut jar, RouteAccess::Public, "/")
        .await;
    assert_eq!(
        ctx.current_user().and_then(|u| u.display_name.as_deref()),
        Some("One")
    );
    assert_eq!(access, Access::Allow);
}

#[tokio::test]
async fn test_public_route_with_bad_cookie_still_clears_it() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = jar_with_token("ghost", "h(p1)");

    let (_, access) = warden
        .handle(&mut session, &mut jar, RouteAccess::Public, "/about")
        .await;

    assert_eq!(access, Access::Allow);
    assert!(jar.get(COOKIE).is_none());
}

#[tokio::test]
async fn test_session_user_ignores_bad_cookie() {
    let warden = default_warden();
    let mut session = Session::with_user(u1());
    let mut jar = jar_with_token("u1", "wrong");

    let (ctx, access) = warden
        .handle(&mut session, &mut jar, RouteAccess::Protected, "/orders")
        .await;

    assert_eq!(ctx.current_user(), Some(&u1()));
    assert_eq!(access, Access::Allow);
    assert!(jar.get(COOKIE).is_some(), "session hit leaves cookie alone");
}

#[tokio::test]
async fn test_protected_redirect_encodes_query_string() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = HashMap::<String, String>::new();

    let (_, access) = warden
        .handle(&mut session, &mut jar, RouteAccess::Protected, "/orders?page=2")
        .await;

    assert_eq!(
        access.redirect_target(),
        Some("/account/login?redirect=/orders%3Fpage%3D2")
    );
}

// =========================================================================
// Malformed and failing inputs
// =========================================================================

#[tokio::test]
async fn test_garbage_cookie_is_cleared() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = HashMap::from([(COOKIE.to_string(), "%%%not-json".to_string())]);

    let ctx = warden.resolve(&mut session, &mut jar).await;

    assert!(!ctx.is_authenticated());
    assert!(jar.is_empty());
}

#[tokio::test]
async fn test_half_token_is_cleared() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = HashMap::from([(
        COOKIE.to_string(),
        r#"j:{"uid":"u1"}"#.to_string(),
    )]);

    let ctx = warden.resolve(&mut session, &mut jar).await;

    assert!(!ctx.is_authenticated());
    assert!(jar.is_empty());
}

#[tokio::test]
async fn test_empty_token_object_is_treated_as_absent() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = HashMap::from([(COOKIE.to_string(), "j:{}".to_string())]);

    let ctx = warden.resolve(&mut session, &mut jar).await;

    assert!(!ctx.is_authenticated());
    assert!(jar.contains_key(COOKIE), "no token means nothing to clear");
}

#[tokio::test]
async fn test_empty_cookie_value_is_treated_as_absent() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = HashMap::from([(COOKIE.to_string(), String::new())]);

    let ctx = warden.resolve(&mut session, &mut jar).await;
    let ctx_again = warden.resolve(&mut session, &mut jar).await;

    assert!(!ctx.is_authenticated());
    assert!(!ctx_again.is_authenticated());
    assert!(jar.contains_key(COOKIE), "empty cookie is not cleared");
    assert_eq!(session, Session::new());
}

#[tokio::test]
async fn test_secret_with_literal_percent_survives_wire_form() {
    init_tracing();
    let user = User::new("u1", CredentialSecret::new("a%41b"));
    let warden = WardenBuilder::new()
        .build(HashMap::from([(user.id.clone(), user.clone())]))
        .unwrap();
    let mut session = Session::new();
    let (name, value) = warden.remember_cookie(&user).unwrap();
    let mut jar = HashMap::from([(name, value)]);

    let ctx = warden.resolve(&mut session, &mut jar).await;

    assert_eq!(ctx.current_user(), Some(&user));
    assert!(jar.contains_key(COOKIE));
}

#[tokio::test]
async fn test_unrelated_cookies_survive_clearing() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = jar_with_token("u1", "wrong");
    jar.insert("theme".into(), "dark".into());

    warden.resolve(&mut session, &mut jar).await;

    assert_eq!(jar.get("theme").map(String::as_str), Some("dark"));
    assert!(!jar.contains_key(COOKIE));
}

#[tokio::test]
async fn test_store_outage_degrades_to_anonymous() {
    init_tracing();
    let warden = WardenBuilder::new().build(DownStore).unwrap();
    let mut session = Session::new();
    let mut jar = jar_with_token("u1", "h(p1)");

    let (ctx, access) = warden
        .handle(&mut session, &mut jar, RouteAccess::Protected, "/dashboard")
        .await;

    assert!(!ctx.is_authenticated());
    assert!(jar.is_empty());
    assert!(!access.is_allowed());
}

#[tokio::test]
async fn test_second_request_after_clear_is_plain_anonymous() {
    let warden = default_warden();
    let mut session = Session::new();
    let mut jar = jar_with_token("u1", "wrong");

    warden.resolve(&mut session, &mut jar).await;
    let ctx = warden.resolve(&mut session, &mut jar).await;

    assert!(!ctx.is_authenticated());
    assert!(jar.is_empty());
    assert_eq!(session, Session::new());
}

// =========================================================================
// Custom configuration
// =========================================================================

#[tokio::test]
async fn test_custom_cookie_name_and_login_path() {
    init_tracing();
    let warden = WardenBuilder::new()
        .cookie_name("remember_me")
        .login_path("/signin")
        .redirect_param("next")
        .build(store())
        .unwrap();

    // The default cookie name is ignored.
    let mut session = Session::new();
    let mut jar = jar_with_token("u1", "h(p1)");
    let (ctx, access) = warden
        .handle(&mut session, &mut jar, RouteAccess::Protected, "/x")
        .await;
    assert!(!ctx.is_authenticated());
    assert_eq!(access.redirect_target(), Some("/signin?next=/x"));

    // The configured one is read.
    let (name, value) = warden.remember_cookie(&u1()).unwrap();
    assert_eq!(name, "remember_me");
    let mut jar = HashMap::from([(name, value)]);
    let (ctx, access) = warden
        .handle(&mut session, &mut jar, RouteAccess::Protected, "/x")
        .await;
    assert!(ctx.is_authenticated());
    assert!(access.is_allowed());
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test]
async fn test_concurrent_requests_resolve_independently() {
    let warden = Arc::new(default_warden());

    let mut handles = Vec::new();
    for i in 0..16 {
        let warden = Arc::clone(&warden);
        handles.push(tokio::spawn(async move {
            let mut session = Session::new();
            let mut jar = if i % 2 == 0 {
                jar_with_token("u1", "h(p1)")
            } else {
                jar_with_token("u1", "wrong")
            };
            let (ctx, _) = warden
                .handle(&mut session, &mut jar, RouteAccess::Protected, "/")
                .await;
            (i, ctx.is_authenticated(), jar.contains_key(COOKIE))
        }));
    }

    for handle in handles {
        let (i, authenticated, cookie_kept) = handle.await.expect("task ok");
        assert_eq!(authenticated, i % 2 == 0);
        assert_eq!(cookie_kept, i % 2 == 0);
    }
}
