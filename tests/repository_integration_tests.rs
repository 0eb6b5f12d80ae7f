use sqlx::PgPool;
use uuid::Uuid;
use webui_admin::{
    models::User,
    repository::{PostgresRepository, Repository},
};

// These tests need a reachable Postgres at DATABASE_URL:
// cargo test --test repository_integration_tests -- --ignored

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

async fn insert_profile(pool: &PgPool, role: Option<&str>) -> User {
    let user = User {
        id: Uuid::new_v4(),
        email: format!("{}@test.com", role.unwrap_or("none")),
        name: None,
        role: role.map(str::to_string),
    };

    sqlx::query("INSERT INTO public.profiles (id, email, name, role) VALUES ($1, $2, $3, $4)")
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.role)
        .execute(pool)
        .await
        .expect("Failed to insert test profile");

    user
}

// --- Tests ---

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn test_get_user_returns_profile() {
    let ctx = DbTestContext::setup().await;
    let admin = insert_profile(&ctx.pool, Some("admin")).await;

    let found = ctx.repository().get_user(admin.id).await.unwrap();

    assert_eq!(found, Some(admin));
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn test_get_user_with_null_role() {
    let ctx = DbTestContext::setup().await;
    let user = insert_profile(&ctx.pool, None).await;

    let found = ctx.repository().get_user(user.id).await.unwrap().unwrap();

    assert_eq!(found.role, None);
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn test_get_user_unknown_id() {
    let ctx = DbTestContext::setup().await;

    let found = ctx.repository().get_user(Uuid::new_v4()).await.unwrap();

    assert!(found.is_none());
}
