pub use sea_orm_migration::prelude::*;

mod m20260912_000001_create_users_and_otps;
mod m20260912_000002_create_catalog;
mod m20260912_000003_create_profiles;
mod m20260912_000004_create_bookings;
mod m20260915_000001_create_web_sessions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260912_000001_create_users_and_otps::Migration),
            Box::new(m20260912_000002_create_catalog::Migration),
            Box::new(m20260912_000003_create_profiles::Migration),
            Box::new(m20260912_000004_create_bookings::Migration),
            Box::new(m20260915_000001_create_web_sessions::Migration),
        ]
    }
}
