// Seed service - provisions fixture identities, the vendor's store and the student's balance

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    backend::{Backend, BackendError},
    config::fixtures::FixtureSet,
    domain::{money::format_amount, Identity, Role},
    services::report::{SeedEntry, SeedReport},
};

pub struct SeedService {
    backend: Arc<dyn Backend>,
    fixtures: Arc<FixtureSet>,
    // Serializes runs within this process; separate processes can still race
    run_lock: Mutex<()>,
}

impl SeedService {
    pub fn new(backend: Arc<dyn Backend>, fixtures: Arc<FixtureSet>) -> Self {
        Self {
            backend,
            fixtures,
            run_lock: Mutex::new(()),
        }
    }

    /// Run all three phases in order: identities, store and catalog, balance.
    ///
    /// Per-step failures are recorded in the report. Only a failure to list the
    /// identity directory aborts the run, since no find-or-create decision can be made.
    pub async fn run(&self) -> Result<SeedReport, BackendError> {
        let _guard = self.run_lock.lock().await;
        let mut report = SeedReport::default();

        let vendor_id = self.provision_identities(&mut report).await?;

        let Some(vendor_id) = vendor_id else {
            warn!("No vendor identity available, skipping store and balance phases");
            return Ok(report);
        };

        self.provision_store(&vendor_id, &mut report).await;

        let student_id = self
            .fixtures
            .student()
            .and_then(|student| report.identity(&student.email))
            .and_then(|outcome| outcome.id.clone());

        match student_id {
            Some(student_id) => self.top_up_student(&student_id, &mut report).await,
            None => debug!("No student identity id available, skipping balance top-up"),
        }

        Ok(report)
    }

    /// Find-or-create every fixture identity; returns the vendor's id if one was resolved
    async fn provision_identities(
        &self,
        report: &mut SeedReport,
    ) -> Result<Option<String>, BackendError> {
        let mut directory: Vec<Identity> = self
            .backend
            .list_identities()
            .await
            .inspect_err(|e| error!("Failed to list identities: {}", e))?;
        debug!(count = directory.len(), "Loaded identity directory");

        let mut vendor_id = None;

        for fixture in &self.fixtures.identities {
            let existing = directory
                .iter()
                .find(|identity| identity.has_email(&fixture.email))
                .map(|identity| identity.id.clone());

            let resolved = match existing {
                Some(id) => {
                    info!(email = %fixture.email, %id, "Identity already exists");
                    report.push(SeedEntry::identity_found(&fixture.email, &id));
                    Some(id)
                }
                None => match self.backend.create_identity(&fixture.to_new_identity()).await {
                    Ok(created) => {
                        info!(email = %fixture.email, id = %created.id, role = %fixture.role, "Created identity");
                        report.push(SeedEntry::identity_created(&fixture.email, &created.id));
                        let id = created.id.clone();
                        directory.push(created);
                        Some(id)
                    }
                    Err(e) => {
                        warn!(email = %fixture.email, "Failed to create identity: {}", e);
                        report.push(SeedEntry::identity_failed(&fixture.email, e.to_string()));
                        None
                    }
                },
            };

            if fixture.role == Role::Vendor {
                if let Some(id) = resolved {
                    vendor_id = Some(id);
                }
            }
        }

        Ok(vendor_id)
    }

    /// Ensure the vendor owns a store; a new store gets the full catalog batch
    async fn provision_store(&self, vendor_id: &str, report: &mut SeedReport) {
        let existing = match self.backend.find_store_by_owner(vendor_id).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!(%vendor_id, "Failed to look up vendor store: {}", e);
                report.push(SeedEntry::store_failed(e.to_string()));
                return;
            }
        };

        if let Some(store) = existing {
            info!(store_id = %store.id, "Vendor store already exists");
            report.push(SeedEntry::store(&store.id, "already exists".to_string()));
            return;
        }

        let store = match self
            .backend
            .create_store(&self.fixtures.store.for_owner(vendor_id))
            .await
        {
            Ok(store) => store,
            Err(e) => {
                warn!(%vendor_id, "Failed to create vendor store: {}", e);
                report.push(SeedEntry::store_failed(e.to_string()));
                return;
            }
        };

        let items: Vec<_> = self
            .fixtures
            .catalog
            .iter()
            .map(|item| item.for_store(&store.id))
            .collect();

        match self.backend.create_catalog_items(&items).await {
            Ok(()) => {
                info!(store_id = %store.id, items = items.len(), "Created vendor store with catalog");
                report.push(SeedEntry::store(
                    &store.id,
                    format!("created with {} menu items", items.len()),
                ));
            }
            Err(e) => {
                warn!(store_id = %store.id, "Created store but catalog insert failed: {}", e);
                report.push(SeedEntry::store_without_catalog(&store.id, e.to_string()));
            }
        }
    }

    /// Raise the student's balance to the floor when it sits below the trigger
    async fn top_up_student(&self, student_id: &str, report: &mut SeedReport) {
        let policy = &self.fixtures.wallet;

        let record = match self.backend.find_balance(student_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(%student_id, "Student has no balance record");
                return;
            }
            Err(e) => {
                warn!(%student_id, "Failed to read student balance: {}", e);
                report.push(SeedEntry::wallet_failed(e.to_string()));
                return;
            }
        };

        if record.balance >= policy.trigger_below as f64 {
            debug!(balance = record.balance, "Student balance already above trigger");
            return;
        }

        match self.backend.update_balance(&record.id, policy.floor).await {
            Ok(()) => {
                let amount = format_amount(&policy.currency_symbol, policy.floor);
                info!(%student_id, from = record.balance, to = policy.floor, "Topped up student balance");
                report.push(SeedEntry::wallet_topped_up(&amount));
            }
            Err(e) => {
                warn!(%student_id, "Failed to top up student balance: {}", e);
                report.push(SeedEntry::wallet_failed(e.to_string()));
            }
        }
    }
}
