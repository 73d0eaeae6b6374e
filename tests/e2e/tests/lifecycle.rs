//! Cross-service lifecycle scenarios: the identity service's administrative
//! actions propagate through the topic exchange into catalog visibility.

use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::watch;
use uuid::Uuid;

use storefront_bus::{MemoryExchange, MemoryPublisher, MessagePublisher};
use storefront_catalog::consumer::lifecycle_consumer;
use storefront_catalog::error::CatalogServiceError;
use storefront_catalog::usecase::product::{
    CreateProductInput, CreateProductUseCase, ListProductsUseCase, UpdateProductInput,
    UpdateProductUseCase,
};
use storefront_domain::pagination::PageRequest;
use storefront_events::{ROUTING_KEYS, USER_DEACTIVATED};
use storefront_identity::domain::types::User;
use storefront_identity::infra::bus::BusEventPublisher;
use storefront_identity::usecase::account::{
    ActivateUserUseCase, DeactivateUserUseCase, DeleteUserUseCase,
};
use storefront_identity::usecase::credential::{
    ConfirmEmailUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
};

use storefront_e2e::{MemoryProductRepo, MemoryUserRepo, RecordingMailer, wait_until};

const JWT_SECRET: &str = "end-to-end-test-secret-that-is-long-enough";

struct Harness {
    users: MemoryUserRepo,
    mailer: RecordingMailer,
    products: MemoryProductRepo,
    exchange: MemoryExchange,
    shutdown: watch::Sender<bool>,
    consumer: tokio::task::JoinHandle<()>,
}

impl Harness {
    fn start() -> Self {
        let users = MemoryUserRepo::default();
        let mailer = RecordingMailer::default();
        let products = MemoryProductRepo::default();
        let exchange = MemoryExchange::new();

        let queue = exchange.bind(&ROUTING_KEYS);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let consumer = tokio::spawn(lifecycle_consumer(queue, products.clone()).run(shutdown_rx));

        Self {
            users,
            mailer,
            products,
            exchange,
            shutdown,
            consumer,
        }
    }

    fn publisher(&self) -> BusEventPublisher<MemoryPublisher> {
        BusEventPublisher {
            bus: self.exchange.publisher(),
        }
    }

    async fn register_confirmed(&self, name: &str, email: &str) -> User {
        let register = RegisterUseCase {
            users: self.users.clone(),
            mailer: self.mailer.clone(),
        };
        let user = register
            .execute(RegisterInput {
                full_name: name.into(),
                email: email.into(),
                password: "a-long-password".into(),
            })
            .await
            .unwrap();

        let confirm = ConfirmEmailUseCase {
            users: self.users.clone(),
            mailer: self.mailer.clone(),
        };
        confirm
            .execute(user.email_confirmation_token.as_deref().unwrap())
            .await
            .unwrap();
        self.users.get(user.id).unwrap()
    }

    async fn seed_product(&self, owner_id: Uuid, name: &str, cents: i64) -> Uuid {
        let create = CreateProductUseCase {
            products: self.products.clone(),
        };
        create
            .execute(
                owner_id,
                CreateProductInput {
                    name: name.into(),
                    description: format!("{name} description"),
                    price: Decimal::new(cents, 2),
                    is_available: true,
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn stop(self) {
        self.shutdown.send(true).unwrap();
        self.consumer.await.unwrap();
    }
}

#[tokio::test]
async fn deactivation_hides_products_and_reactivation_restores_them() {
    let harness = Harness::start();

    let alice = harness
        .register_confirmed("Alice Adams", "alice@example.com")
        .await;
    let bob = harness
        .register_confirmed("Bob Brown", "bob@example.com")
        .await;

    harness.seed_product(alice.id, "Alice teapot", 1999).await;
    harness.seed_product(alice.id, "Alice kettle", 2999).await;
    harness.seed_product(bob.id, "Bob mug", 499).await;

    // Alice can log in and her products are publicly listed.
    let login = LoginUseCase {
        users: harness.users.clone(),
        jwt_secret: JWT_SECRET.into(),
    };
    login
        .execute(LoginInput {
            email: "alice@example.com".into(),
            password: "a-long-password".into(),
        })
        .await
        .unwrap();
    let listing_before = ListProductsUseCase {
        products: harness.products.clone(),
    }
    .execute(PageRequest::default())
    .await
    .unwrap();
    assert_eq!(listing_before.len(), 3);

    // Administrator deactivates Alice; the catalog converges on hiding hers.
    DeactivateUserUseCase {
        users: harness.users.clone(),
        events: harness.publisher(),
    }
    .execute(alice.id)
    .await
    .unwrap();

    let products = harness.products.clone();
    assert!(
        wait_until(
            || products.visible_for(alice.id).is_empty(),
            Duration::from_secs(2)
        )
        .await
    );

    // Deactivated accounts cannot log in.
    let blocked = login
        .execute(LoginInput {
            email: "alice@example.com".into(),
            password: "a-long-password".into(),
        })
        .await;
    assert!(blocked.is_err());

    // The public listing no longer carries Alice's products, Bob's remain.
    let listing_hidden = ListProductsUseCase {
        products: harness.products.clone(),
    }
    .execute(PageRequest::default())
    .await
    .unwrap();
    assert_eq!(listing_hidden.len(), 1);
    assert_eq!(listing_hidden[0].owner_id, bob.id);

    // Reactivation restores the listing, unchanged in content.
    ActivateUserUseCase {
        users: harness.users.clone(),
        events: harness.publisher(),
    }
    .execute(alice.id)
    .await
    .unwrap();

    assert!(
        wait_until(
            || products.visible_for(alice.id).len() == 2,
            Duration::from_secs(2)
        )
        .await
    );
    let restored = harness.products.visible_for(alice.id);
    let names: Vec<&str> = restored.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alice kettle", "Alice teapot"]);
    assert!(restored.iter().all(|p| p.deleted_at.is_none()));
    assert_eq!(restored[0].price, Decimal::new(2999, 2));

    harness.stop().await;
}

#[tokio::test]
async fn deletion_permanently_removes_the_owned_product_set() {
    let harness = Harness::start();

    let alice = harness
        .register_confirmed("Alice Adams", "alice@example.com")
        .await;
    let bob = harness
        .register_confirmed("Bob Brown", "bob@example.com")
        .await;
    harness.seed_product(alice.id, "Alice teapot", 1999).await;
    harness.seed_product(alice.id, "Alice kettle", 2999).await;
    harness.seed_product(bob.id, "Bob mug", 499).await;

    DeleteUserUseCase {
        users: harness.users.clone(),
        events: harness.publisher(),
    }
    .execute(alice.id)
    .await
    .unwrap();

    let products = harness.products.clone();
    assert!(
        wait_until(
            || products.all_for(alice.id).is_empty(),
            Duration::from_secs(2)
        )
        .await
    );
    // Gone for good, not soft-deleted; the account is gone too.
    assert!(harness.products.all_for(alice.id).is_empty());
    assert_eq!(harness.products.all_for(bob.id).len(), 1);
    assert!(harness.users.get(alice.id).is_none());

    harness.stop().await;
}

#[tokio::test]
async fn redelivered_deactivation_leaves_the_same_end_state() {
    let harness = Harness::start();

    let alice = harness
        .register_confirmed("Alice Adams", "alice@example.com")
        .await;
    harness.seed_product(alice.id, "Alice teapot", 1999).await;
    harness.seed_product(alice.id, "Alice kettle", 2999).await;

    DeactivateUserUseCase {
        users: harness.users.clone(),
        events: harness.publisher(),
    }
    .execute(alice.id)
    .await
    .unwrap();

    let products = harness.products.clone();
    assert!(
        wait_until(
            || products.visible_for(alice.id).is_empty(),
            Duration::from_secs(2)
        )
        .await
    );
    let after_first: Vec<_> = harness.products.all_for(alice.id);

    // The transport redelivers the same event (at-least-once).
    let raw = storefront_events::UserLifecycleEvent::Deactivated(
        storefront_events::UserDeactivated {
            user_id: alice.id,
            email: alice.email.clone(),
            deactivated_at: chrono::Utc::now(),
        },
    );
    harness
        .exchange
        .publisher()
        .publish(USER_DEACTIVATED, &raw.encode())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let mut after_second = harness.products.all_for(alice.id);
    let mut after_first = after_first;
    after_first.sort_by_key(|p| p.id);
    after_second.sort_by_key(|p| p.id);
    assert_eq!(after_first, after_second);

    harness.stop().await;
}

#[tokio::test]
async fn updating_a_foreign_product_is_forbidden_and_changes_nothing() {
    let harness = Harness::start();

    let alice = harness
        .register_confirmed("Alice Adams", "alice@example.com")
        .await;
    let bob = harness
        .register_confirmed("Bob Brown", "bob@example.com")
        .await;
    let teapot = harness.seed_product(alice.id, "Alice teapot", 1999).await;

    let update = UpdateProductUseCase {
        products: harness.products.clone(),
    };
    let result = update
        .execute(
            teapot,
            bob.id,
            UpdateProductInput {
                name: Some("Bob's now".into()),
                description: None,
                price: Some(Decimal::new(1, 2)),
                is_available: None,
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(CatalogServiceError::ForbiddenOwnership)
    ));

    let unchanged = harness.products.visible_for(alice.id);
    assert_eq!(unchanged[0].name, "Alice teapot");
    assert_eq!(unchanged[0].price, Decimal::new(1999, 2));

    harness.stop().await;
}
