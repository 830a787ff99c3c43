//! Wallet registrations: one invite code per wallet address
//!
//! Registrations live in the document store keyed by the lowercased wallet
//! address, so the primary key enforces one registration per wallet.

use fomo_common::db::{Document, DocumentStore};
use fomo_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

pub const WALLET_COLLECTION: &str = "wallet_registrations";

/// Register request body
#[derive(Debug, Clone, Deserialize)]
pub struct WalletRegistrationRequest {
    pub wallet_address: String,
    pub invite_code: String,
    #[serde(default)]
    pub twitter_username: Option<String>,
}

/// Stored registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRegistration {
    pub id: String,
    pub wallet_address: String,
    pub invite_code: String,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Answer to "is this wallet registered?"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletStatus {
    pub is_registered: bool,
    pub wallet_address: String,
    pub invite_code: Option<String>,
    pub twitter_username: Option<String>,
}

/// Addresses compare case-insensitively
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

fn from_document(doc: Document) -> Result<WalletRegistration> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

fn not_registered(address: &str) -> Error {
    Error::NotFound(format!("Wallet registration not found: {}", address))
}

/// Registration status; an unknown wallet is simply not registered
pub async fn check(store: &DocumentStore, address: &str) -> Result<WalletStatus> {
    let address = normalize_address(address);
    match store.get(WALLET_COLLECTION, &address).await? {
        Some(doc) => {
            let registration = from_document(doc)?;
            Ok(WalletStatus {
                is_registered: true,
                wallet_address: registration.wallet_address,
                invite_code: Some(registration.invite_code),
                twitter_username: registration.twitter_username,
            })
        }
        None => Ok(WalletStatus {
            is_registered: false,
            wallet_address: address,
            invite_code: None,
            twitter_username: None,
        }),
    }
}

/// Register a wallet; a wallet that already holds an invite code is rejected
pub async fn register(store: &DocumentStore, request: WalletRegistrationRequest) -> Result<WalletRegistration> {
    let address = normalize_address(&request.wallet_address);
    if address.is_empty() {
        return Err(Error::InvalidInput("wallet_address is required".to_string()));
    }
    let invite_code = request.invite_code.trim().to_uppercase();
    if invite_code.is_empty() {
        return Err(Error::InvalidInput("invite_code is required".to_string()));
    }

    let registration = WalletRegistration {
        id: address.clone(),
        wallet_address: address.clone(),
        invite_code,
        twitter_username: request.twitter_username.filter(|name| !name.trim().is_empty()),
        created_at: None,
        updated_at: None,
    };

    let doc = match serde_json::to_value(&registration)? {
        Value::Object(mut map) => {
            map.retain(|_, v| !v.is_null());
            map
        }
        _ => return Err(Error::Internal("registration did not serialize to an object".to_string())),
    };

    match store.insert(WALLET_COLLECTION, doc).await {
        Ok(doc) => {
            info!("Registered wallet {}", address);
            from_document(doc)
        }
        Err(Error::InvalidInput(_)) => Err(Error::InvalidInput(
            "This wallet is already registered with an invite code".to_string(),
        )),
        Err(e) => Err(e),
    }
}

/// Update the twitter handle of a registration; `None` leaves it unchanged
pub async fn update(
    store: &DocumentStore,
    address: &str,
    twitter_username: Option<String>,
) -> Result<WalletRegistration> {
    let address = normalize_address(address);
    let mut patch = Document::new();
    if let Some(name) = twitter_username {
        patch.insert("twitter_username".to_string(), Value::String(name));
    }

    let doc = store
        .merge(WALLET_COLLECTION, &address, patch)
        .await?
        .ok_or_else(|| not_registered(&address))?;
    from_document(doc)
}

pub async fn unregister(store: &DocumentStore, address: &str) -> Result<()> {
    let address = normalize_address(address);
    if !store.delete(WALLET_COLLECTION, &address).await? {
        return Err(not_registered(&address));
    }
    info!("Unregistered wallet {}", address);
    Ok(())
}
