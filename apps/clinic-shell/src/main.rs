//! Demo shell standing in for the feature-page layer: wires the in-memory
//! adapters into the client core, walks one login / sync / scoped-read /
//! logout pass and logs what a feature page would observe along the way.

use std::collections::HashSet;
use std::env;
use std::sync::Arc;

use dotenvy::dotenv;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use core_lib::adapters::in_memory_cache::InMemoryCache;
use core_lib::adapters::in_memory_directory::InMemoryCredentialDirectory;
use core_lib::adapters::in_memory_feed::InMemoryChangeFeed;
use core_lib::adapters::in_memory_gateway::{InMemoryAuthGateway, ScriptedAccount};
use core_lib::adapters::in_memory_snapshots::InMemorySnapshotSource;
use core_lib::adapters::tab_store::TabSessionStore;
use core_lib::application::client::{ClientCore, CoreConfig};
use core_lib::domain::records::{ChangeEvent, Record, SHARED_SCOPE, Table};
use core_lib::domain::role::{Capability, Role};
use core_lib::domain::tenant::TenantConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize tracing (logging)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting clinic shell v{}...", env!("CARGO_PKG_VERSION"));

    // --- Configuration ---
    let username = env::var("DEMO_USERNAME").unwrap_or_else(|_| "manager".to_string());
    let password = env::var("DEMO_PASSWORD").unwrap_or_else(|_| "demo-password".to_string());

    // --- Backend stand-ins ---
    let gateway = Arc::new(InMemoryAuthGateway::default());
    gateway.add_account(
        &username,
        ScriptedAccount {
            password: password.clone(),
            user_id: "u-demo".into(),
            display_name: "Demo Manager".into(),
            role: Role::Manager,
            assigned_stores: HashSet::from(["StoreA".to_string()]),
            tenant: TenantConfig {
                tenant_id: "t-demo".into(),
                name: "Lakeside Clinic".into(),
                doctor_list: vec!["Dr. Wu".into(), "Dr. Ito".into()],
                ..Default::default()
            },
        },
    );

    let snapshots = Arc::new(InMemorySnapshotSource::default());
    snapshots.put(
        Table::Patients,
        vec![
            Record::new("pat-1").with_store("StoreA").with_field("name", "A. Nguyen"),
            Record::new("pat-2").with_store("StoreB").with_field("name", "B. Okafor"),
        ],
    );
    snapshots.put(
        Table::Revenue,
        vec![
            Record::new("rev-1").with_store("StoreA").with_field("amount", 120),
            Record::new("rev-2").with_store(SHARED_SCOPE).with_field("amount", 45),
        ],
    );

    let feed = Arc::new(InMemoryChangeFeed::default());
    let core = ClientCore::new(
        gateway,
        Arc::new(InMemoryCredentialDirectory::default()),
        Arc::new(TabSessionStore::default()),
        feed.clone(),
        snapshots,
        Arc::new(InMemoryCache::default()),
        CoreConfig::default(),
    );

    // --- Login and initial sync ---
    let report = core.login(&username, &password).await?;
    info!(source = ?report.source, tables = report.tables, "logged in and syncing");

    if let Some(config) = core.tenant_config().await {
        info!(tenant = %config.name, doctors = config.doctor_list.len(), "tenant config loaded");
    }
    info!(
        can_bill = core.has_capability(Capability::ManageBilling).await,
        can_configure = core.has_capability(Capability::ConfigureTenant).await,
        "capability check"
    );

    // --- A change notification arrives while the page is open ---
    feed.publish(ChangeEvent::insert(
        Table::Patients,
        Record::new("pat-3").with_store("StoreA").with_field("name", "C. Haddad"),
    ))?;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let view = core.scoped_view().await;
    for table in [Table::Patients, Table::Revenue, Table::Bookings] {
        info!(
            table = table.as_str(),
            visible = view.len(table),
            "scoped view for the demo manager"
        );
    }

    // --- Teardown ---
    core.logout().await;
    info!("logged out; subscriptions closed");

    Ok(())
}
