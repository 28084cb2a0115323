use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{EntityTrait, Set};
use tracing::{info, warn};

use crate::clearance::Clearance;
use crate::config::Config;
use crate::db::{Store, hash_password};
use crate::entities::{prelude::*, role_names};

/// Idempotent startup seeding: the role-name lookup rows and the bootstrap
/// admin account. Safe to run on every boot. Best-effort: every failure is
/// logged and the next step still runs; seeding never aborts startup.
pub async fn run(store: &Store, config: &Config) {
    if let Err(e) = seed_role_names(store).await {
        warn!("Role name seeding failed: {e:#}");
    }
    if let Err(e) = seed_bootstrap_admin(store, config).await {
        warn!("Bootstrap admin seeding failed: {e:#}");
    }
}

/// One presentation row per clearance combination (the full power set of
/// the three flags, masks 0 through 7).
async fn seed_role_names(store: &Store) -> Result<()> {
    for clearance in Clearance::power_set() {
        let model = role_names::ActiveModel {
            id: Set(clearance.bits()),
            name: Set(clearance.label()),
        };

        RoleNames::insert(model)
            .on_conflict(
                OnConflict::column(role_names::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&store.conn)
            .await
            .context("Failed to seed role names")?;
    }

    Ok(())
}

async fn seed_bootstrap_admin(store: &Store, config: &Config) -> Result<()> {
    let email = config.bootstrap.admin_email.to_lowercase();

    if store.get_user_by_email(&email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(&config.bootstrap.admin_password, &config.security)?;

    match store
        .insert_user(
            &config.bootstrap.admin_name,
            &email,
            &password_hash,
            Clearance::USER.with(Clearance::ADMIN),
            true,
        )
        .await
    {
        Ok(admin) => info!("Bootstrap admin created (id {})", admin.id),
        // A concurrent boot may have won the insert; that is fine.
        Err(e) => warn!("Bootstrap admin not created: {e:#}"),
    }

    Ok(())
}
