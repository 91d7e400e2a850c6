#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::module_inception)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use cookie::Cookie;
    use tempfile::{tempdir, TempDir};

    use crate::auth::SessionKeys;
    use crate::store::{Database, NewPizza};

    use crate::http::{router, AppState};

    async fn test_state(seed_catalog: bool) -> Result<(AppState, TempDir)> {
        let dir = tempdir()?;
        let db = Database::open(dir.path()).await?;
        let state = AppState {
            db,
            session_keys: SessionKeys::new("test-secret", Duration::from_secs(86_400)),
            seed_catalog,
        };
        Ok((state, dir))
    }

    const SIGNUP_FORM: &[(&str, &str)] = &[
        ("name", "Ada"),
        ("email", "ada@example.com"),
        ("password", "hunter2"),
    ];

    const LOGIN_FORM: &[(&str, &str)] =
        &[("email", "ada@example.com"), ("password", "hunter2")];

    #[tokio::test]
    async fn home_without_cookie_redirects_to_login() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        let server = TestServer::new(router(state))?;

        let response = server.get("/").await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
        Ok(())
    }

    #[tokio::test]
    async fn signup_login_then_catalog_roundtrip() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        state
            .db
            .insert_pizza(NewPizza {
                name: String::from("Margherita"),
                price: 200,
                description: String::from("Classic Margherita Pizza"),
            })
            .await?;
        let server = TestServer::new(router(state))?;

        let signup = server.post("/signup").form(&SIGNUP_FORM).await;
        assert_eq!(signup.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(signup.header("location"), "/login");

        let login = server.post("/login").form(&LOGIN_FORM).await;
        assert_eq!(login.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(login.header("location"), "/");
        let session = login.cookie("token");
        assert!(!session.value().is_empty());

        let home = server.get("/").add_cookie(session).await;
        assert_eq!(home.status_code(), StatusCode::OK);
        let body = home.text();
        assert!(body.contains("Welcome, Ada"));
        assert!(body.contains("Margherita"));
        Ok(())
    }

    #[tokio::test]
    async fn login_with_unknown_email_returns_fixed_text() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        let server = TestServer::new(router(state))?;

        let response = server.post("/login").form(&LOGIN_FORM).await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.text(), "User not found!");
        Ok(())
    }

    #[tokio::test]
    async fn login_with_wrong_password_returns_fixed_text() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        let server = TestServer::new(router(state))?;

        server.post("/signup").form(&SIGNUP_FORM).await;
        let response = server
            .post("/login")
            .form(&[("email", "ada@example.com"), ("password", "wrong")])
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.text(), "Invalid credentials!");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts_without_leaking_detail() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        let server = TestServer::new(router(state))?;

        server.post("/signup").form(&SIGNUP_FORM).await;
        let response = server.post("/signup").form(&SIGNUP_FORM).await;

        assert_eq!(response.status_code(), StatusCode::CONFLICT);
        assert_eq!(response.text(), "Error: that email is already registered");
        Ok(())
    }

    #[tokio::test]
    async fn signup_requires_all_fields() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        let server = TestServer::new(router(state))?;

        let response = server
            .post("/signup")
            .form(&[("name", "Ada"), ("email", "ada@example.com")])
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "Error: password is required");
        Ok(())
    }

    #[tokio::test]
    async fn signup_rejects_implausible_email() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        let server = TestServer::new(router(state))?;

        let response = server
            .post("/signup")
            .form(&[("name", "Ada"), ("email", "nope"), ("password", "hunter2")])
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn tampered_session_cookie_redirects_to_login() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        let server = TestServer::new(router(state))?;

        server.post("/signup").form(&SIGNUP_FORM).await;
        let login = server.post("/login").form(&LOGIN_FORM).await;
        let token = login.cookie("token").value().to_string();

        let mut tampered = String::from(&token[..token.len() - 1]);
        let last = token.chars().last().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        let response = server
            .get("/")
            .add_cookie(Cookie::new("token", tampered))
            .await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_the_session_cookie() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        let server = TestServer::new(router(state))?;

        let response = server.get("/logout").await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");

        let cleared = response.cookie("token");
        assert!(cleared.value().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn add_pizza_is_hidden_when_seeding_disabled() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        let server = TestServer::new(router(state.clone()))?;

        let response = server.get("/add-pizza").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(state.db.pizza_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn add_pizza_seeds_the_catalog_when_enabled() -> Result<()> {
        let (state, _dir) = test_state(true).await?;
        let server = TestServer::new(router(state.clone()))?;

        let response = server.get("/add-pizza").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "Pizza added");

        let pizzas = state.db.list_pizzas().await;
        assert_eq!(pizzas.len(), 1);
        assert_eq!(pizzas[0].name, "Margherita");
        assert_eq!(pizzas[0].price, 200);
        Ok(())
    }

    #[tokio::test]
    async fn signup_and_login_pages_render_forms() -> Result<()> {
        let (state, _dir) = test_state(false).await?;
        let server = TestServer::new(router(state))?;

        let signup = server.get("/signup").await;
        assert_eq!(signup.status_code(), StatusCode::OK);
        assert!(signup.text().contains("action=\"/signup\""));

        let login = server.get("/login").await;
        assert_eq!(login.status_code(), StatusCode::OK);
        assert!(login.text().contains("action=\"/login\""));
        Ok(())
    }
}
