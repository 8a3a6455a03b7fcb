use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use thiserror::Error;

const PLACEHOLDER_PHOTO: &str = "https://placekitten.com/24/24";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Contact {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub photo: String,
}

impl Contact {
    pub fn new(
        id: u64,
        name: impl Into<String>,
        email: impl Into<String>,
        photo: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            photo: photo.into(),
        }
    }

    /// Up to two uppercase initials, used in place of the photo.
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials
        }
    }
}

/// A selected contact. Copies the contact fields at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub photo: String,
}

impl From<&Contact> for Chip {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name.clone(),
            email: contact.email.clone(),
            photo: contact.photo.clone(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate contact id {0} in catalog")]
    DuplicateId(u64),

    #[error("contact id {0} has an empty name")]
    MissingName(u64),
}

/// Fixed, ordered list of selectable contacts.
#[derive(Debug, Clone)]
pub struct Catalog {
    contacts: Vec<Contact>,
}

impl Catalog {
    pub fn new(contacts: Vec<Contact>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for contact in &contacts {
            if !seen.insert(contact.id) {
                return Err(CatalogError::DuplicateId(contact.id));
            }
            if contact.name.trim().is_empty() {
                return Err(CatalogError::MissingName(contact.id));
            }
        }
        Ok(Self { contacts })
    }

    pub fn builtin() -> Self {
        Self {
            contacts: vec![
                Contact::new(1, "Ayushman Singh", "ayush@example.com", PLACEHOLDER_PHOTO),
                Contact::new(2, "Ravi Kumar", "ravi@example.com", PLACEHOLDER_PHOTO),
                Contact::new(3, "Sanjay Dubey", "sanjay@example.com", PLACEHOLDER_PHOTO),
                Contact::new(4, "Bharkar Rai", "bhaskar@example.com", PLACEHOLDER_PHOTO),
            ],
        }
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn get(&self, id: u64) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.id == id)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    contacts: Vec<Contact>,
}

/// Load a catalog from a `.toml` (`[[contacts]]` tables) or `.json` (array) file.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog at {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let contacts = match extension.as_deref() {
        Some("toml") => {
            let file: CatalogFile = toml::from_str(&raw)
                .with_context(|| format!("failed to parse {} as TOML", path.display()))?;
            file.contacts
        }
        Some("json") => serde_json::from_str::<Vec<Contact>>(&raw)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?,
        _ => bail!(
            "unsupported catalog format for {}, expected .toml or .json",
            path.display()
        ),
    };

    let catalog = Catalog::new(contacts)
        .with_context(|| format!("invalid catalog in {}", path.display()))?;
    log::info!(
        "loaded {} contacts from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}
