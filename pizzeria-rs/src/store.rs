//! Document store: JSON-file-backed collections of users, pizzas, and orders.
//!
//! Each collection is held in memory behind a `tokio::sync::RwLock` and written
//! through to one JSON file per collection under the data directory. Writes are
//! atomic per document only; there are no cross-collection transactions.
//!
//! This module owns the authoritative schema for all persisted records.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

const USERS_FILE: &str = "users.json";
const PIZZAS_FILE: &str = "pizzas.json";
const ORDERS_FILE: &str = "orders.json";

/// A registered account. `password_hash` is a PHC-format Argon2 string;
/// plaintext never reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// A catalog entry. Price is in whole currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pizza {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Preparing,
    Delivered,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// An order referencing a pizza by id. The reference is not validated against
/// the catalog collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub pizza_id: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewPizza {
    pub name: String,
    pub price: u32,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub pizza_id: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("failed to create data dir {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to read collection {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write collection {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("corrupt collection {path}: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },
}

/// One on-disk collection. Documents keep insertion order.
#[derive(Debug)]
struct Collection<T> {
    path: PathBuf,
    docs: RwLock<Vec<T>>,
}

impl<T: Clone + Serialize + DeserializeOwned> Collection<T> {
    /// Load a collection file. A missing file is an empty collection;
    /// an unreadable or unparseable file is an error.
    async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let docs = match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                path: path.display().to_string(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        Ok(Self {
            path,
            docs: RwLock::new(docs),
        })
    }

    /// Write the given snapshot to the collection file.
    async fn persist(&self, docs: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_vec_pretty(docs).map_err(|e| StoreError::Write {
            path: self.path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.display().to_string(),
                source,
            })
    }

    /// Append a document and write through. The in-memory append is rolled
    /// back if the file write fails.
    async fn insert(&self, doc: T) -> Result<(), StoreError> {
        let mut guard = self.docs.write().await;
        guard.push(doc);
        if let Err(err) = self.persist(&guard).await {
            guard.pop();
            return Err(err);
        }
        Ok(())
    }

    async fn all(&self) -> Vec<T> {
        self.docs.read().await.clone()
    }

    async fn len(&self) -> usize {
        self.docs.read().await.len()
    }
}

/// Handle to the three collections. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    users: Collection<User>,
    pizzas: Collection<Pizza>,
    orders: Collection<Order>,
}

impl Database {
    /// Open the store under `data_dir`, creating the directory if needed.
    /// This doubles as the startup health check: any unreadable or corrupt
    /// collection file fails the open instead of degrading silently.
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: data_dir.display().to_string(),
                source,
            })?;

        let users = Collection::load(data_dir.join(USERS_FILE)).await?;
        let pizzas = Collection::load(data_dir.join(PIZZAS_FILE)).await?;
        let orders = Collection::load(data_dir.join(ORDERS_FILE)).await?;

        Ok(Self {
            inner: Arc::new(Inner {
                users,
                pizzas,
                orders,
            }),
        })
    }

    /// Insert a user, enforcing email uniqueness. The check and the append
    /// happen under one write guard so concurrent signups cannot race.
    pub async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        let email = normalize_email(&new.email);
        let mut guard = self.inner.users.docs.write().await;

        if guard.iter().any(|user| user.email == email) {
            return Err(StoreError::DuplicateEmail(email));
        }

        let user = User {
            id: generate_id(),
            name: new.name,
            email,
            password_hash: new.password_hash,
        };
        guard.push(user.clone());
        if let Err(err) = self.inner.users.persist(&guard).await {
            guard.pop();
            return Err(err);
        }
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let email = normalize_email(email);
        self.inner
            .users
            .docs
            .read()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.inner.users.len().await
    }

    pub async fn insert_pizza(&self, new: NewPizza) -> Result<Pizza, StoreError> {
        let pizza = Pizza {
            id: generate_id(),
            name: new.name,
            price: new.price,
            description: new.description,
        };
        self.inner.pizzas.insert(pizza.clone()).await?;
        Ok(pizza)
    }

    /// All pizzas in insertion order.
    pub async fn list_pizzas(&self) -> Vec<Pizza> {
        self.inner.pizzas.all().await
    }

    pub async fn pizza_count(&self) -> usize {
        self.inner.pizzas.len().await
    }

    /// Insert an order with status `Pending`. No HTTP route drives order
    /// creation; this is the store half of the order record.
    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn insert_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let order = Order {
            id: generate_id(),
            customer_name: new.customer_name,
            pizza_id: new.pizza_id,
            address: new.address,
            phone: new.phone,
            status: OrderStatus::default(),
            placed_at: Utc::now(),
        };
        self.inner.orders.insert(order.clone()).await?;
        Ok(order)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn list_orders(&self) -> Vec<Order> {
        self.inner.orders.all().await
    }

    pub async fn order_count(&self) -> usize {
        self.inner.orders.len().await
    }
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Emails are compared after trim + ASCII lowercase, so `A@x.com` and
/// `a@x.com` are one identity.
fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
