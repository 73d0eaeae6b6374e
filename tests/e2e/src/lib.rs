//! In-memory fixtures for cross-service scenario tests.
//!
//! Both services' repository ports get hash-map implementations with the
//! same visibility semantics as the SQL ones, so the end-to-end flows can
//! run through the real use cases, the real event codec and the in-memory
//! exchange without a database or broker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use storefront_catalog::domain::repository::ProductRepository;
use storefront_catalog::domain::types::{Product, ProductFilter};
use storefront_catalog::error::CatalogServiceError;
use storefront_domain::pagination::PageRequest;
use storefront_identity::domain::repository::{Mailer, UserRepository};
use storefront_identity::domain::types::User;
use storefront_identity::error::IdentityServiceError;

// ── Identity fixtures ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemoryUserRepo {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MemoryUserRepo {
    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }
}

impl UserRepository for MemoryUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, IdentityServiceError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_confirmation_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, IdentityServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email_confirmation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, IdentityServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.password_reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, IdentityServiceError> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn create(&self, user: &User) -> Result<(), IdentityServiceError> {
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), IdentityServiceError> {
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), IdentityServiceError> {
        self.users.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// Mailer that records what would have been sent.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl Mailer for RecordingMailer {
    async fn send_confirmation(
        &self,
        email: &str,
        _name: &str,
        _token: &str,
    ) -> Result<(), IdentityServiceError> {
        self.sent
            .lock()
            .unwrap()
            .push(("confirmation".into(), email.into()));
        Ok(())
    }

    async fn send_welcome(&self, email: &str, _name: &str) -> Result<(), IdentityServiceError> {
        self.sent.lock().unwrap().push(("welcome".into(), email.into()));
        Ok(())
    }

    async fn send_password_reset(
        &self,
        email: &str,
        _name: &str,
        _token: &str,
    ) -> Result<(), IdentityServiceError> {
        self.sent.lock().unwrap().push(("reset".into(), email.into()));
        Ok(())
    }
}

// ── Catalog fixtures ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemoryProductRepo {
    products: Arc<Mutex<HashMap<Uuid, Product>>>,
}

impl MemoryProductRepo {
    pub fn visible_for(&self, owner_id: Uuid) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.owner_id == owner_id && !p.is_deleted)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    pub fn all_for(&self, owner_id: Uuid) -> Vec<Product> {
        self.products
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect()
    }
}

impl ProductRepository for MemoryProductRepo {
    async fn find_by_id(
        &self,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<Option<Product>, CatalogServiceError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .get(&id)
            .filter(|p| include_deleted || !p.is_deleted)
            .cloned())
    }

    async fn list(&self, _page: PageRequest) -> Result<Vec<Product>, CatalogServiceError> {
        let mut products: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| !p.is_deleted)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, CatalogServiceError> {
        Ok(self.visible_for(owner_id))
    }

    async fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, u64), CatalogServiceError> {
        let mut products = self.list(page).await?;
        if let Some(term) = filter.term.as_deref() {
            let term = term.to_lowercase();
            products.retain(|p| {
                p.name.to_lowercase().contains(&term)
                    || p.description.to_lowercase().contains(&term)
            });
        }
        if let Some(owner_id) = filter.owner_id {
            products.retain(|p| p.owner_id == owner_id);
        }
        let total = products.len() as u64;
        Ok((products, total))
    }

    async fn create(&self, product: &Product) -> Result<(), CatalogServiceError> {
        self.products
            .lock()
            .unwrap()
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), CatalogServiceError> {
        self.products
            .lock()
            .unwrap()
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), CatalogServiceError> {
        self.products.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn soft_delete_by_owner(
        &self,
        owner_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, CatalogServiceError> {
        let mut products = self.products.lock().unwrap();
        let mut changed = 0;
        for product in products.values_mut() {
            if product.owner_id == owner_id && !product.is_deleted {
                product.is_deleted = true;
                product.deleted_at = Some(deleted_at);
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn restore_by_owner(&self, owner_id: Uuid) -> Result<u64, CatalogServiceError> {
        let mut products = self.products.lock().unwrap();
        let mut changed = 0;
        for product in products.values_mut() {
            if product.owner_id == owner_id && product.is_deleted {
                product.is_deleted = false;
                product.deleted_at = None;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<u64, CatalogServiceError> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|_, p| p.owner_id != owner_id);
        Ok((before - products.len()) as u64)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Poll `condition` until it holds or the timeout elapses.
pub async fn wait_until<F: Fn() -> bool>(condition: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
