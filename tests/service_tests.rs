use std::sync::Arc;

use sea_orm::{ConnectionTrait, Statement};

use scoreboard::clearance::Clearance;
use scoreboard::config::{Config, SecurityConfig};
use scoreboard::db::{self, Store, hash_password};
use scoreboard::mailer::NoopMailer;
use scoreboard::services::{
    AuthError, AuthService, ScoreError, ScoreService, SeaOrmAdminService, SeaOrmAuthService,
    SeaOrmScoreService,
};

fn test_security() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        ..SecurityConfig::default()
    }
}

async fn test_store() -> Store {
    Store::new("sqlite::memory:")
        .await
        .expect("Failed to create store")
}

async fn seed_user(store: &Store, name: &str, email: &str, clearance: Clearance) -> i32 {
    let hash = hash_password("secret", &test_security()).unwrap();
    store
        .insert_user(name, email, &hash, clearance, false)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let store = test_store().await;

    let mut config = Config::default();
    config.security = test_security();

    db::seed::run(&store, &config).await;
    db::seed::run(&store, &config).await;

    let admin = store
        .get_user_by_email("admin@localhost")
        .await
        .unwrap()
        .expect("Bootstrap admin should exist");
    assert_eq!(admin.clearance, Clearance::USER.with(Clearance::ADMIN));
    assert!(admin.needs_password_change);

    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_seed_continues_past_failures() {
    let store = test_store().await;
    let mut config = Config::default();
    config.security = test_security();

    // Break the role-name step; the bootstrap admin must still be seeded.
    let backend = store.conn.get_database_backend();
    store
        .conn
        .execute(Statement::from_string(
            backend,
            "DROP TABLE role_names".to_string(),
        ))
        .await
        .unwrap();

    db::seed::run(&store, &config).await;

    assert!(
        store
            .get_user_by_email("admin@localhost")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_grant_and_revoke_are_idempotent() {
    let store = test_store().await;
    let id = seed_user(&store, "A", "a@example.com", Clearance::USER).await;

    store.grant_role(id, Clearance::WANNABE).await.unwrap();
    store.grant_role(id, Clearance::WANNABE).await.unwrap();

    let user = store.get_user(id).await.unwrap().unwrap();
    assert_eq!(user.clearance, Clearance::USER.with(Clearance::WANNABE));

    // Revoking a flag the user does not hold changes nothing.
    store.revoke_role(id, Clearance::ADMIN).await.unwrap();
    let user = store.get_user(id).await.unwrap().unwrap();
    assert_eq!(user.clearance, Clearance::USER.with(Clearance::WANNABE));

    store.revoke_role(id, Clearance::WANNABE).await.unwrap();
    let user = store.get_user(id).await.unwrap().unwrap();
    assert_eq!(user.clearance, Clearance::USER);
}

#[tokio::test]
async fn test_delete_user_reparents_ledger_entries() {
    let store = test_store().await;
    let author = seed_user(&store, "Author", "author@example.com", Clearance::USER).await;
    let target = seed_user(
        &store,
        "Target",
        "target@example.com",
        Clearance::USER.with(Clearance::WANNABE),
    )
    .await;

    store
        .insert_score_entry(target, author, 10, "first")
        .await
        .unwrap();
    store
        .insert_score_entry(target, author, 20, "second")
        .await
        .unwrap();

    assert!(store.delete_user(author).await.unwrap());
    assert!(store.get_user(author).await.unwrap().is_none());

    // The entries survive with the sentinel actor.
    let entries = store.scores_for_user(target).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.added_by_id == 0));
}

#[tokio::test]
async fn test_score_totals_order_by_sum_descending() {
    let store = test_store().await;
    let wannabe = Clearance::USER.with(Clearance::WANNABE);
    let low = seed_user(&store, "Low", "low@example.com", wannabe).await;
    let high = seed_user(&store, "High", "high@example.com", wannabe).await;

    store.insert_score_entry(low, 0, 5, "").await.unwrap();
    store.insert_score_entry(high, 0, 30, "").await.unwrap();
    store.insert_score_entry(high, 0, -10, "").await.unwrap();
    store.insert_score_entry(low, 0, 3, "").await.unwrap();

    let totals = store.score_totals().await.unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].user_id, high);
    assert_eq!(totals[0].total, 20);
    assert_eq!(totals[1].user_id, low);
    assert_eq!(totals[1].total, 8);
}

#[tokio::test]
async fn test_leaderboard_keeps_rows_for_deleted_targets() {
    let store = test_store().await;
    let wannabe = Clearance::USER.with(Clearance::WANNABE);
    let target = seed_user(&store, "Gone", "gone@example.com", wannabe).await;

    store.insert_score_entry(target, 0, 15, "").await.unwrap();
    store.delete_user(target).await.unwrap();

    let scores = SeaOrmScoreService::new(store);
    let rows = scores.leaderboard().await.unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows[0].user.is_none());
    assert_eq!(rows[0].score, 15);
}

#[tokio::test]
async fn test_wannabe_submit_records_single_penalty() {
    let store = test_store().await;
    let wannabe = Clearance::USER.with(Clearance::WANNABE);
    let actor_id = seed_user(&store, "Sneak", "sneak@example.com", wannabe).await;
    let actor = store.get_user(actor_id).await.unwrap().unwrap();

    let scores = SeaOrmScoreService::new(store.clone());

    let result = scores.submit(&actor, actor_id, 1000, "for me").await;
    assert!(matches!(result, Err(ScoreError::WannabePenalized)));

    let entries = store.scores_for_user(actor_id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].score, -100);
    assert_eq!(entries[0].user_id, actor_id);
    assert_eq!(entries[0].added_by_id, actor_id);
}

#[tokio::test]
async fn test_submit_rejects_non_wannabe_target() {
    let store = test_store().await;
    let actor_id = seed_user(&store, "Member", "m@example.com", Clearance::USER).await;
    let rocker_id = seed_user(&store, "Rocker", "r@example.com", Clearance::USER).await;
    let actor = store.get_user(actor_id).await.unwrap().unwrap();

    let scores = SeaOrmScoreService::new(store.clone());

    let result = scores.submit(&actor, rocker_id, 10, "no").await;
    assert!(matches!(result, Err(ScoreError::Forbidden(_))));
    assert!(store.scores_for_user(rocker_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_rejects_overlong_description() {
    let store = test_store().await;
    let wannabe = Clearance::USER.with(Clearance::WANNABE);
    let actor_id = seed_user(&store, "Member", "m@example.com", Clearance::USER).await;
    let target_id = seed_user(&store, "Target", "t@example.com", wannabe).await;
    let actor = store.get_user(actor_id).await.unwrap().unwrap();

    let scores = SeaOrmScoreService::new(store);

    let result = scores.submit(&actor, target_id, 1, &"d".repeat(251)).await;
    assert!(matches!(result, Err(ScoreError::Validation(_))));
}

#[tokio::test]
async fn test_change_password_flow() {
    let store = test_store().await;
    let hash = hash_password("old-password", &test_security()).unwrap();
    let user = store
        .insert_user("Rotator", "rot@example.com", &hash, Clearance::USER, true)
        .await
        .unwrap();

    let auth = SeaOrmAuthService::new(store.clone(), test_security());

    // Wrong old password gets the generic credentials error.
    let result = auth
        .change_password(user.id, "not-it", "new-password", "new-password")
        .await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));

    auth.change_password(user.id, "old-password", "new-password", "new-password")
        .await
        .unwrap();

    // The rotation flag clears and the new password logs in.
    let updated = store.get_user(user.id).await.unwrap().unwrap();
    assert!(!updated.needs_password_change);
    let logged_in = auth.login("rot@example.com", "new-password").await.unwrap();
    assert_eq!(logged_in.id, user.id);
    // The returned record carries this login's stamp, not a stale read.
    assert!(logged_in.last_login.is_some());
}

#[tokio::test]
async fn test_admin_service_create_user_in_development() {
    let store = test_store().await;
    let admin_id = seed_user(
        &store,
        "Boss",
        "boss@example.com",
        Clearance::USER.with(Clearance::ADMIN),
    )
    .await;
    let admin = store.get_user(admin_id).await.unwrap().unwrap();

    let service = SeaOrmAdminService::new(store.clone(), Arc::new(NoopMailer), test_security());
    use scoreboard::services::AdminService;

    let created = service.create_user("New", "NEW@Example.com").await.unwrap();
    assert_eq!(created.email, "new@example.com");
    assert_eq!(created.clearance, Clearance::USER);
    assert!(created.needs_password_change);

    // Self-deletion and protected ids are refused, others go through.
    assert!(service.delete_user(&admin, admin_id).await.is_err());
    assert!(service.delete_user(&admin, 0).await.is_err());
    service.delete_user(&admin, created.id).await.unwrap();
    assert!(store.get_user(created.id).await.unwrap().is_none());
}
